//! Types for the provider registry.

use serde::Serialize;

use crate::command::CommandResultDecoder;
use crate::specific_error::{SpecificError, SpecificErrorDecoder};
use crate::types::CommandResult;

/// A decoder registered for one element/namespace pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Decodes `<command/>` responses.
    Command(CommandResultDecoder),
    /// Decodes one command-specific error element.
    SpecificError(SpecificErrorDecoder),
}

/// Result of decoding a registered element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodedElement {
    Command(CommandResult),
    SpecificError(SpecificError),
}

impl DecodedElement {
    /// The command result, if this is one.
    #[must_use]
    pub fn as_command(&self) -> Option<&CommandResult> {
        match self {
            Self::Command(result) => Some(result),
            Self::SpecificError(_) => None,
        }
    }

    /// The specific error, if this is one.
    #[must_use]
    pub fn as_specific_error(&self) -> Option<&SpecificError> {
        match self {
            Self::SpecificError(error) => Some(error),
            Self::Command(_) => None,
        }
    }
}
