//! Configuration constants and decoder settings.

use std::str::FromStr;

use crate::error::{DecodeError, Result};

/// Namespace of the ad-hoc commands protocol (XEP-0050).
pub const COMMANDS_NAMESPACE: &str = "http://jabber.org/protocol/commands";

/// Namespace of embedded data forms (XEP-0004).
pub const DATA_FORM_NAMESPACE: &str = "jabber:x:data";

/// Namespace of the defined stanza error conditions (RFC 6120).
pub const STANZA_ERROR_NAMESPACE: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";

/// Local name of the top-level command element.
pub const COMMAND_ELEMENT: &str = "command";

/// Local name of the data form element.
pub const DATA_FORM_ELEMENT: &str = "x";

/// How `action` and `execute` attribute values outside the action
/// enumeration are treated.
///
/// `Strict` fails the decode, `Lenient` maps them to [`Action::Unknown`].
/// The `status` attribute is always lenient regardless of this setting.
///
/// [`Action::Unknown`]: crate::types::Action::Unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionPolicy {
    /// Reject unknown action literals.
    #[default]
    Strict,
    /// Substitute `Action::Unknown` for unknown action literals.
    Lenient,
}

impl ActionPolicy {
    /// Get the policy name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

impl FromStr for ActionPolicy {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        parse_action_policy(s)
    }
}

/// Parse an action policy name.
///
/// # Examples
/// ```
/// use xmpp_adhoc_commands::config::{parse_action_policy, ActionPolicy};
///
/// assert_eq!(parse_action_policy("strict").unwrap(), ActionPolicy::Strict);
/// assert_eq!(parse_action_policy("Lenient").unwrap(), ActionPolicy::Lenient);
/// assert!(parse_action_policy("loose").is_err());
/// ```
pub fn parse_action_policy(name: &str) -> Result<ActionPolicy> {
    match name.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(ActionPolicy::Strict),
        "lenient" => Ok(ActionPolicy::Lenient),
        _ => Err(DecodeError::InvalidPolicy(name.to_string())),
    }
}

/// Settings shared by the command decoder and the registry built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderConfig {
    /// Treatment of unknown action literals.
    pub action_policy: ActionPolicy,
}

impl DecoderConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the action policy.
    #[must_use]
    pub fn with_action_policy(mut self, policy: ActionPolicy) -> Self {
        self.action_policy = policy;
        self
    }
}
