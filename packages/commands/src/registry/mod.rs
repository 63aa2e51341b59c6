//! Provider registry for namespace-qualified element decoding.
//!
//! Decoders are registered for `(element, namespace)` pairs, so a
//! dispatcher can route any incoming extension element to the decoder that
//! owns it.

mod config;
mod core;
mod handler;
mod types;

pub use config::create_command_registry;
pub use self::core::ProviderRegistry;
pub use handler::ElementDecoder;
pub use types::{DecodedElement, Provider};
