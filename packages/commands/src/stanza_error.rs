//! Stanza error decoding (RFC 6120 §8.3).
//!
//! An `<error/>` inside a command response carries one defined condition
//! from the stanza error namespace, an optional human-readable text, and
//! optionally an application-specific condition. For ad-hoc commands the
//! latter is one of the [`SpecificErrorCondition`]s.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::config::{COMMANDS_NAMESPACE, STANZA_ERROR_NAMESPACE};
use crate::error::{DecodeError, Result};
use crate::registry::ElementDecoder;
use crate::specific_error::{SpecificError, SpecificErrorCondition, SpecificErrorDecoder};
use crate::xml::{StartTag, XmlEvent, XmlStream};

/// Error type, telling the sender whether and how to retry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorType {
    Auth,
    Cancel,
    Continue,
    Modify,
    Wait,
}

/// Defined stanza error conditions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Condition {
    BadRequest,
    Conflict,
    FeatureNotImplemented,
    Forbidden,
    Gone,
    InternalServerError,
    ItemNotFound,
    JidMalformed,
    NotAcceptable,
    NotAllowed,
    NotAuthorized,
    PolicyViolation,
    RecipientUnavailable,
    Redirect,
    RegistrationRequired,
    RemoteServerNotFound,
    RemoteServerTimeout,
    ResourceConstraint,
    ServiceUnavailable,
    SubscriptionRequired,
    UndefinedCondition,
    UnexpectedRequest,
}

impl Condition {
    /// Whether the condition element carries an address as text (`gone`, `redirect`).
    #[must_use]
    pub fn carries_text(&self) -> bool {
        matches!(self, Self::Gone | Self::Redirect)
    }
}

/// A child element of `<error/>` that is neither a defined condition nor text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionElement {
    pub name: String,
    pub namespace: String,
}

/// A decoded stanza error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StanzaError {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,

    /// Entity that generated the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,

    /// Text of a `gone` or `redirect` condition element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// `xml:lang` of the text element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Command-specific condition, if one was present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific: Option<SpecificError>,

    /// Other application-specific children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionElement>,
}

/// Decoder for stanza `<error/>` elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct StanzaErrorDecoder;

impl StanzaErrorDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ElementDecoder for StanzaErrorDecoder {
    type Output = StanzaError;

    fn decode<R: BufRead>(&self, stream: &mut XmlStream<R>, start: &StartTag) -> Result<StanzaError> {
        let mut error = StanzaError {
            error_type: start.attribute("type").and_then(|t| t.parse().ok()),
            by: start.attribute("by").map(String::from),
            ..Default::default()
        };

        loop {
            match stream.next_event()? {
                XmlEvent::Start(child) => decode_child(stream, &child, &mut error)?,
                XmlEvent::End { .. } => return Ok(error),
                XmlEvent::Text(_) => {}
                XmlEvent::Eof => {
                    return Err(DecodeError::UnexpectedEof {
                        element: start.name.clone(),
                    })
                }
            }
        }
    }
}

fn decode_child<R: BufRead>(
    stream: &mut XmlStream<R>,
    child: &StartTag,
    error: &mut StanzaError,
) -> Result<()> {
    if child.namespace == STANZA_ERROR_NAMESPACE {
        if child.name == "text" {
            error.lang = child.attribute("xml:lang").map(String::from);
            error.text = Some(stream.read_text(child)?);
            return Ok(());
        }
        if error.condition.is_some() {
            tracing::debug!(condition = %child.name, "Ignoring additional stanza error condition");
            return stream.skip_element(child);
        }
        let condition = child.name.parse::<Condition>().unwrap_or_else(|_| {
            tracing::warn!(condition = %child.name, "Unknown stanza error condition");
            Condition::UndefinedCondition
        });
        if condition.carries_text() {
            error.condition_text = read_condition_text(stream, child)?;
        } else {
            stream.skip_element(child)?;
        }
        error.condition = Some(condition);
        return Ok(());
    }

    if child.namespace == COMMANDS_NAMESPACE {
        if let Some(condition) = SpecificErrorCondition::from_element_name(&child.name) {
            error.specific = Some(SpecificErrorDecoder::new(condition).decode(stream, child)?);
            return Ok(());
        }
    }

    error.extensions.push(ExtensionElement {
        name: child.name.clone(),
        namespace: child.namespace.clone(),
    });
    stream.skip_element(child)
}

/// Text of a `gone` or `redirect` element.
///
/// Content with child elements is not an address; it is skipped and yields `None`.
fn read_condition_text<R: BufRead>(
    stream: &mut XmlStream<R>,
    start: &StartTag,
) -> Result<Option<String>> {
    let mut text = String::new();
    let mut text_only = true;
    loop {
        match stream.next_event()? {
            XmlEvent::Text(piece) => text.push_str(&piece),
            XmlEvent::Start(found) => {
                tracing::debug!(
                    condition = %start.name,
                    found = %found.name,
                    "Skipping element content in condition"
                );
                text_only = false;
                stream.skip_element(&found)?;
            }
            XmlEvent::End { .. } => break,
            XmlEvent::Eof => {
                return Err(DecodeError::UnexpectedEof {
                    element: start.name.clone(),
                })
            }
        }
    }
    Ok((text_only && !text.trim().is_empty()).then_some(text))
}
