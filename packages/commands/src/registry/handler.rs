//! Element decoder trait definition.

use std::io::BufRead;

use crate::error::Result;
use crate::xml::{StartTag, XmlStream};

/// Trait for element decoders.
///
/// A decoder is handed the stream right after the start tag of the element
/// it owns. It reads the attributes from `start`, consumes the element's
/// content and returns once the matching end tag has been pulled, leaving
/// the stream positioned on whatever follows.
///
/// Decoders hold only immutable configuration, so one value can serve many
/// decode calls from different threads as long as each call has its own
/// stream.
pub trait ElementDecoder: Send + Sync {
    /// Decoded representation of the element.
    type Output;

    /// Decode the element that starts with `start`.
    ///
    /// # Arguments
    /// * `stream` - Stream positioned just after `start`
    /// * `start` - The element's start tag
    fn decode<R: BufRead>(&self, stream: &mut XmlStream<R>, start: &StartTag) -> Result<Self::Output>;
}
