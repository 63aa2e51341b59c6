//! Error types for the decoder.
//!
//! Structural failures come from the XML stream itself (tokenizer errors,
//! truncated input, elements where only text is allowed). Semantic failures
//! come from attribute values that must name a known literal.

use thiserror::Error;

/// Main error type for the decoder library.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The XML tokenizer could not produce the next event.
    #[error("XML parsing failed: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Input ended before the element was closed.
    #[error("Unexpected end of input inside <{element}>")]
    UnexpectedEof { element: String },

    /// A child element appeared where only text content is allowed.
    #[error("Unexpected element <{found}> inside text-only element <{parent}>")]
    UnexpectedElement { parent: String, found: String },

    /// Action literal that is not part of the action enumeration.
    #[error("Invalid action '{value}' in attribute '{attribute}'")]
    InvalidAction { attribute: String, value: String },

    /// Data form without a recognised `type` attribute.
    #[error("Invalid data form type: {}", .0.as_deref().map(|t| format!("'{t}'")).unwrap_or_else(|| "missing".to_string()))]
    InvalidFormType(Option<String>),

    /// Unknown action policy name.
    #[error("Invalid action policy: '{0}'. Expected 'strict' or 'lenient'")]
    InvalidPolicy(String),

    /// No provider registered for the element.
    #[error("No provider for element <{name}>{}", namespace_suffix(.namespace))]
    UnknownElement { name: String, namespace: String },

    /// The stream held no element at all.
    #[error("No element found in input")]
    EmptyDocument,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

fn namespace_suffix(namespace: &str) -> String {
    if namespace.is_empty() {
        String::new()
    } else {
        format!(" in namespace {namespace}")
    }
}

impl DecodeError {
    /// Whether the failure comes from the shape of the XML rather than a value in it.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Xml(_) | Self::UnexpectedEof { .. } | Self::UnexpectedElement { .. }
        )
    }
}

impl From<quick_xml::events::attributes::AttrError> for DecodeError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
