//! XML streaming primitives used by every decoder.

mod stream;

pub use stream::{StartTag, XmlEvent, XmlStream};
