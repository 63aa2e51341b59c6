//! Streaming decoder for XMPP ad-hoc command responses (XEP-0050).
//!
//! This crate turns a `<command xmlns="http://jabber.org/protocol/commands"/>`
//! element into a typed [`CommandResult`], and recognizes the
//! command-specific error conditions that travel inside stanza errors.
//!
//! # Example
//!
//! ```
//! use xmpp_adhoc_commands::{decode_command, Action, NoteType, Status};
//!
//! let xml = r#"
//!     <command xmlns="http://jabber.org/protocol/commands"
//!              node="config" sessionid="s1" status="executing">
//!         <actions execute="next"><next/><complete/></actions>
//!         <note type="warn">Almost there</note>
//!     </command>"#;
//!
//! let result = decode_command(xml).unwrap();
//! assert_eq!(result.status, Some(Status::Executing));
//! assert_eq!(result.execute_action, Some(Action::Next));
//! assert_eq!(result.allowed_actions, vec![Action::Next, Action::Complete]);
//! assert_eq!(result.notes[0].note_type, NoteType::Warn);
//! ```
//!
//! # Architecture
//!
//! - [`xml`]: Pull-based XML event stream
//! - [`command`]: The `<command/>` decoder
//! - [`specific_error`]: Command-specific error conditions and their decoder
//! - [`form`]: Embedded data form decoder
//! - [`stanza_error`]: Embedded stanza error decoder
//! - [`registry`]: Element/namespace to decoder dispatch
//! - [`types`]: Decoded command data types
//! - [`config`]: Namespaces and decoder settings
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod form;
pub mod registry;
pub mod specific_error;
pub mod stanza_error;
pub mod types;
pub mod xml;

// Re-export main functions
pub use command::{decode_command, decode_command_with, CommandResultDecoder};

// Re-export commonly used items
pub use config::{ActionPolicy, DecoderConfig};
pub use error::{DecodeError, Result};
pub use registry::{create_command_registry, DecodedElement, ElementDecoder, ProviderRegistry};
pub use specific_error::{SpecificError, SpecificErrorCondition, SpecificErrorDecoder};
pub use types::{Action, CommandResult, Note, NoteType, Status};
pub use xml::XmlStream;
