//! Core data types for decoded ad-hoc command responses.
//!
//! These types mirror the XEP-0050 `<command/>` element: its status and
//! action attributes, the allowed actions, notes and embedded payloads.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::form::DataForm;
use crate::stanza_error::StanzaError;

/// Execution status reported by the responder.
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
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Status {
    /// The command is being executed.
    Executing,
    /// The command has completed.
    Completed,
    /// The command has been canceled.
    Canceled,
}

impl Status {
    /// Resolve the `status` attribute.
    ///
    /// Matching ignores case. Absent or unrecognised text yields `None`.
    ///
    /// # Examples
    /// ```
    /// use xmpp_adhoc_commands::types::Status;
    ///
    /// assert_eq!(Status::from_attribute(Some("COMPLETED")), Some(Status::Completed));
    /// assert_eq!(Status::from_attribute(Some("done")), None);
    /// assert_eq!(Status::from_attribute(None), None);
    /// ```
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| v.parse().ok())
    }
}

/// Command protocol verb.
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
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    /// Execute the command or the next stage.
    Execute,
    /// Cancel the command session.
    Cancel,
    /// Go back to the previous stage.
    Prev,
    /// Proceed to the next stage.
    Next,
    /// Complete the command.
    Complete,
    /// Placeholder for an action the decoder could not identify.
    Unknown,
}

/// Severity of a note.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoteType {
    #[default]
    Info,
    Warn,
    Error,
}

impl NoteType {
    /// Resolve the `type` attribute of a note, falling back to `info`.
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

/// Human-readable note attached to a command response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note severity.
    #[serde(rename = "type")]
    pub note_type: NoteType,
    /// Note text, whitespace preserved.
    pub text: String,
}

impl Note {
    /// Create a new note.
    #[must_use]
    pub fn new(note_type: NoteType, text: impl Into<String>) -> Self {
        Self {
            note_type,
            text: text.into(),
        }
    }
}

/// A decoded `<command/>` element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandResult {
    /// Opaque session token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Command identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    /// Execution status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Action that produced this response.
    ///
    /// `Some(Action::Unknown)` means the attribute was present but not
    /// recognised; `None` means it was absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,

    /// Action the responder recommends executing next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execute_action: Option<Action>,

    /// Actions allowed for the next stage, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_actions: Vec<Action>,

    /// Embedded data form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<DataForm>,

    /// Notes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,

    /// Embedded stanza error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StanzaError>,
}

impl CommandResult {
    /// Check whether an action is among the allowed actions.
    #[must_use]
    pub fn allows(&self, action: Action) -> bool {
        self.allowed_actions.contains(&action)
    }

    /// Iterate over notes of the given type.
    pub fn notes_of(&self, note_type: NoteType) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(move |n| n.note_type == note_type)
    }
}
