//! Command-specific error conditions (XEP-0050 §4.6).
//!
//! These conditions travel as empty child elements of a stanza `<error/>` in
//! the commands namespace. The tag name alone identifies the condition.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::Result;
use crate::registry::ElementDecoder;
use crate::xml::{StartTag, XmlStream};

/// Fine-grained error condition signalled by a command responder.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    IntoStaticStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SpecificErrorCondition {
    /// The responding entity does not support the requested action.
    BadAction,
    /// The requesting entity sent a malformed action.
    MalformedAction,
    /// The requested locale is not supported.
    BadLocale,
    /// The data form payload is invalid.
    BadPayload,
    /// The session id is unknown or invalid.
    BadSessionid,
    /// The session has expired.
    SessionExpired,
}

impl SpecificErrorCondition {
    /// Element name carrying this condition.
    #[must_use]
    pub fn element_name(&self) -> &'static str {
        self.into()
    }

    /// Look up the condition for an element name.
    ///
    /// # Examples
    /// ```
    /// use xmpp_adhoc_commands::specific_error::SpecificErrorCondition;
    ///
    /// assert_eq!(
    ///     SpecificErrorCondition::from_element_name("session-expired"),
    ///     Some(SpecificErrorCondition::SessionExpired)
    /// );
    /// assert_eq!(SpecificErrorCondition::from_element_name("item-not-found"), None);
    /// ```
    #[must_use]
    pub fn from_element_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}

/// A decoded command-specific error element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificError {
    pub condition: SpecificErrorCondition,
}

impl SpecificError {
    #[must_use]
    pub fn new(condition: SpecificErrorCondition) -> Self {
        Self { condition }
    }
}

/// Decoder for one specific-error element.
///
/// One value exists per condition; the registry registers each under its
/// element name. Decoding ignores attributes and content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecificErrorDecoder {
    condition: SpecificErrorCondition,
}

impl SpecificErrorDecoder {
    /// Create a decoder that always yields `condition`.
    #[must_use]
    pub fn new(condition: SpecificErrorCondition) -> Self {
        Self { condition }
    }

    /// Decoders for every condition, in declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        SpecificErrorCondition::iter().map(Self::new)
    }

    /// The condition this decoder produces.
    #[must_use]
    pub fn condition(&self) -> SpecificErrorCondition {
        self.condition
    }

    /// Element name this decoder is registered under.
    #[must_use]
    pub fn element_name(&self) -> &'static str {
        self.condition.element_name()
    }
}

impl ElementDecoder for SpecificErrorDecoder {
    type Output = SpecificError;

    /// Return the constant condition after consuming the element.
    ///
    /// The subtree is skipped so the caller's loop stays in step; only a
    /// broken stream can make this fail.
    fn decode<R: BufRead>(&self, stream: &mut XmlStream<R>, start: &StartTag) -> Result<SpecificError> {
        stream.skip_element(start)?;
        Ok(SpecificError::new(self.condition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode_with(condition: SpecificErrorCondition, xml: &str) -> SpecificError {
        let mut stream = XmlStream::from_xml(xml);
        let start = stream.next_start().unwrap().unwrap();
        SpecificErrorDecoder::new(condition)
            .decode(&mut stream, &start)
            .unwrap()
    }

    #[test]
    fn test_element_names() {
        let names: Vec<&str> = SpecificErrorCondition::iter()
            .map(|c| c.element_name())
            .collect();
        assert_eq!(
            names,
            vec![
                "bad-action",
                "malformed-action",
                "bad-locale",
                "bad-payload",
                "bad-sessionid",
                "session-expired",
            ]
        );
    }

    #[test]
    fn test_from_element_name_is_exact() {
        assert_eq!(
            SpecificErrorCondition::from_element_name("bad-locale"),
            Some(SpecificErrorCondition::BadLocale)
        );
        assert_eq!(SpecificErrorCondition::from_element_name("Bad-Locale"), None);
        assert_eq!(SpecificErrorCondition::from_element_name("badLocale"), None);
    }

    #[test]
    fn test_bad_sessionid_ignores_body() {
        let error = decode_with(
            SpecificErrorCondition::BadSessionid,
            r#"<bad-sessionid xmlns="http://jabber.org/protocol/commands" extra="1">junk<x/></bad-sessionid>"#,
        );
        assert_eq!(error, SpecificError::new(SpecificErrorCondition::BadSessionid));
    }

    #[test]
    fn test_each_decoder_yields_its_condition() {
        for decoder in SpecificErrorDecoder::all() {
            let xml = format!("<{}/>", decoder.element_name());
            assert_eq!(decode_with(decoder.condition(), &xml).condition, decoder.condition());
        }
    }

    #[test]
    fn test_decoder_leaves_stream_after_element() {
        let mut stream = XmlStream::from_xml("<error><bad-action><a/></bad-action><text/></error>");
        stream.next_start().unwrap();
        let start = stream.next_start().unwrap().unwrap();

        SpecificErrorDecoder::new(SpecificErrorCondition::BadAction)
            .decode(&mut stream, &start)
            .unwrap();

        let next = stream.next_start().unwrap().unwrap();
        assert_eq!(next.name, "text");
    }

    #[test]
    fn test_all_covers_six_conditions() {
        assert_eq!(SpecificErrorDecoder::all().count(), 6);
    }
}
