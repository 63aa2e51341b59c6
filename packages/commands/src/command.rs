//! Streaming decoder for `<command/>` responses.
//!
//! The decoder reads the command's own attributes from its start tag, then
//! pulls events until the element closes. Every child start tag is mapped
//! once to a child kind and handled; payloads with their own schema
//! (data forms, stanza errors) are handed to their decoders, which consume
//! the whole subtree before control returns here.

use std::io::BufRead;

use crate::config::{
    ActionPolicy, DecoderConfig, COMMANDS_NAMESPACE, COMMAND_ELEMENT, DATA_FORM_ELEMENT,
    DATA_FORM_NAMESPACE,
};
use crate::error::{DecodeError, Result};
use crate::form::FormDecoder;
use crate::registry::ElementDecoder;
use crate::stanza_error::StanzaErrorDecoder;
use crate::types::{Action, CommandResult, Note, NoteType, Status};
use crate::xml::{StartTag, XmlEvent, XmlStream};

/// Children of `<command/>` that contribute to the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandChild {
    /// `<actions/>`: carries the `execute` attribute.
    Actions,
    /// `<next/>`, `<complete/>`, `<prev/>`.
    AllowedAction(Action),
    /// `<x xmlns="jabber:x:data"/>`.
    Form,
    /// `<note/>`.
    Note,
    /// `<error/>`.
    Error,
}

impl CommandChild {
    fn classify(tag: &StartTag) -> Option<Self> {
        match tag.name.as_str() {
            name if name == DATA_FORM_ELEMENT && tag.namespace == DATA_FORM_NAMESPACE => {
                Some(Self::Form)
            }
            "actions" => Some(Self::Actions),
            "next" => Some(Self::AllowedAction(Action::Next)),
            "complete" => Some(Self::AllowedAction(Action::Complete)),
            "prev" => Some(Self::AllowedAction(Action::Prev)),
            "note" => Some(Self::Note),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Decoder for ad-hoc command responses.
///
/// Stateless apart from its configuration; reuse one value for any number
/// of decode calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandResultDecoder {
    config: DecoderConfig,
}

impl CommandResultDecoder {
    /// Create a decoder with default settings (strict actions).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with the given settings.
    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// The decoder's settings.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Resolve an `action` or `execute` attribute value.
    ///
    /// The literal `unknown` is accepted as [`Action::Unknown`]. Any other
    /// unrecognised literal fails under [`ActionPolicy::Strict`] and maps to
    /// [`Action::Unknown`] under [`ActionPolicy::Lenient`].
    fn resolve_action(&self, attribute: &str, value: &str) -> Result<Action> {
        match value.parse::<Action>() {
            Ok(action) => Ok(action),
            Err(_) => match self.config.action_policy {
                ActionPolicy::Strict => Err(DecodeError::InvalidAction {
                    attribute: attribute.to_string(),
                    value: value.to_string(),
                }),
                ActionPolicy::Lenient => {
                    tracing::debug!(attribute, value, "Unrecognised action, using 'unknown'");
                    Ok(Action::Unknown)
                }
            },
        }
    }
}

impl ElementDecoder for CommandResultDecoder {
    type Output = CommandResult;

    /// Decode a `<command/>` element.
    ///
    /// # Errors
    /// * `InvalidAction` for an unknown `action`/`execute` literal in strict mode
    /// * `InvalidFormType` when the embedded form has no valid type
    /// * structural errors when the stream breaks or ends before `</command>`
    fn decode<R: BufRead>(&self, stream: &mut XmlStream<R>, start: &StartTag) -> Result<CommandResult> {
        let mut result = CommandResult {
            session_id: start.attribute("sessionid").map(String::from),
            node: start.attribute("node").map(String::from),
            status: Status::from_attribute(start.attribute("status")),
            action: start
                .attribute("action")
                .map(|value| self.resolve_action("action", value))
                .transpose()?,
            ..Default::default()
        };

        let form_decoder = FormDecoder::new();
        let error_decoder = StanzaErrorDecoder::new();
        let top_depth = stream.depth();

        loop {
            match stream.next_event()? {
                XmlEvent::Start(child) => match CommandChild::classify(&child) {
                    Some(CommandChild::Actions) => {
                        if let Some(execute) = child.attribute("execute") {
                            result.execute_action = Some(self.resolve_action("execute", execute)?);
                        }
                    }
                    Some(CommandChild::AllowedAction(action)) => result.allowed_actions.push(action),
                    Some(CommandChild::Form) => {
                        result.form = Some(form_decoder.decode(stream, &child)?);
                    }
                    Some(CommandChild::Note) => {
                        let type_attr = child.attribute("type");
                        let note_type = NoteType::from_attribute(type_attr);
                        if let Some(t) = type_attr.filter(|t| t.parse::<NoteType>().is_err()) {
                            tracing::debug!(note_type = %t, "Unrecognised note type, using 'info'");
                        }
                        let text = stream.read_text(&child)?;
                        result.notes.push(Note::new(note_type, text));
                    }
                    Some(CommandChild::Error) => {
                        result.error = Some(error_decoder.decode(stream, &child)?);
                    }
                    None => {
                        tracing::trace!(element = %child.name, namespace = %child.namespace, "Ignoring command child");
                    }
                },
                XmlEvent::End { .. } if stream.depth() < top_depth => break,
                XmlEvent::End { .. } | XmlEvent::Text(_) => {}
                XmlEvent::Eof => {
                    return Err(DecodeError::UnexpectedEof {
                        element: start.name.clone(),
                    })
                }
            }
        }

        tracing::debug!(
            node = ?result.node,
            status = ?result.status,
            notes = result.notes.len(),
            "Decoded command response"
        );
        Ok(result)
    }
}

/// Decode a standalone `<command/>` document.
///
/// # Examples
/// ```
/// use xmpp_adhoc_commands::command::decode_command;
/// use xmpp_adhoc_commands::types::Status;
///
/// let xml = r#"<command xmlns="http://jabber.org/protocol/commands" node="list" status="completed"/>"#;
/// let result = decode_command(xml).unwrap();
/// assert_eq!(result.node.as_deref(), Some("list"));
/// assert_eq!(result.status, Some(Status::Completed));
/// ```
pub fn decode_command(xml: &str) -> Result<CommandResult> {
    decode_command_with(xml, DecoderConfig::default())
}

/// Decode a standalone `<command/>` document with the given settings.
///
/// The root element must be `command`, in the commands namespace or
/// unqualified.
pub fn decode_command_with(xml: &str, config: DecoderConfig) -> Result<CommandResult> {
    let mut stream = XmlStream::from_xml(xml);
    let start = stream.next_start()?.ok_or(DecodeError::EmptyDocument)?;
    if start.name != COMMAND_ELEMENT
        || !(start.namespace.is_empty() || start.namespace == COMMANDS_NAMESPACE)
    {
        return Err(DecodeError::UnknownElement {
            name: start.name,
            namespace: start.namespace,
        });
    }
    CommandResultDecoder::with_config(config).decode(&mut stream, &start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormType;
    use crate::specific_error::{SpecificError, SpecificErrorCondition};
    use crate::stanza_error::{Condition, ErrorType};
    use pretty_assertions::assert_eq;

    const NS: &str = r#"xmlns="http://jabber.org/protocol/commands""#;

    fn decode(xml: &str) -> Result<CommandResult> {
        decode_command(xml)
    }

    fn lenient(xml: &str) -> Result<CommandResult> {
        decode_command_with(
            xml,
            DecoderConfig::new().with_action_policy(ActionPolicy::Lenient),
        )
    }

    #[test]
    fn test_end_to_end_note_example() {
        let result = decode(
            r#"<command sessionid="s1" node="n1" status="completed"><note type="warn">Done with warning</note></command>"#,
        )
        .unwrap();

        assert_eq!(
            result,
            CommandResult {
                session_id: Some("s1".to_string()),
                node: Some("n1".to_string()),
                status: Some(Status::Completed),
                notes: vec![Note::new(NoteType::Warn, "Done with warning")],
                ..Default::default()
            }
        );
        assert!(result.allowed_actions.is_empty());
        assert!(result.form.is_none());
        assert!(result.error.is_none());
        assert!(result.action.is_none());
    }

    #[test]
    fn test_absent_attributes_stay_unset() {
        let result = decode(&format!("<command {NS}/>")).unwrap();
        assert_eq!(result, CommandResult::default());
    }

    #[test]
    fn test_status_any_casing() {
        for (literal, expected) in [
            ("executing", Status::Executing),
            ("Completed", Status::Completed),
            ("CANCELED", Status::Canceled),
        ] {
            let result = decode(&format!(r#"<command {NS} status="{literal}"/>"#)).unwrap();
            assert_eq!(result.status, Some(expected));
        }
    }

    #[test]
    fn test_unrecognised_status_is_unset() {
        for literal in ["", "done", "cancelled"] {
            let result = decode(&format!(r#"<command {NS} status="{literal}"/>"#)).unwrap();
            assert_eq!(result.status, None, "status={literal:?}");
        }
    }

    #[test]
    fn test_known_action_literals() {
        for (literal, expected) in [
            ("execute", Action::Execute),
            ("cancel", Action::Cancel),
            ("prev", Action::Prev),
            ("next", Action::Next),
            ("complete", Action::Complete),
            ("unknown", Action::Unknown),
        ] {
            let result = decode(&format!(r#"<command {NS} action="{literal}"/>"#)).unwrap();
            assert_eq!(result.action, Some(expected));
        }
    }

    #[test]
    fn test_invalid_action_strict_fails() {
        let err = decode(&format!(r#"<command {NS} action="jump"/>"#)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidAction { ref attribute, ref value } if attribute == "action" && value == "jump"
        ));
        assert!(!err.is_structural());
    }

    #[test]
    fn test_invalid_action_lenient_is_unknown() {
        let result = lenient(&format!(r#"<command {NS} action="jump"/>"#)).unwrap();
        assert_eq!(result.action, Some(Action::Unknown));
    }

    #[test]
    fn test_execute_action() {
        let result = decode(&format!(
            r#"<command {NS} status="executing"><actions execute="complete"><prev/><complete/></actions></command>"#
        ))
        .unwrap();

        assert_eq!(result.execute_action, Some(Action::Complete));
        assert_eq!(result.allowed_actions, vec![Action::Prev, Action::Complete]);
    }

    #[test]
    fn test_invalid_execute_follows_policy() {
        let xml = format!(r#"<command {NS}><actions execute="later"/></command>"#);

        let err = decode(&xml).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidAction { ref attribute, .. } if attribute == "execute"));

        let result = lenient(&xml).unwrap();
        assert_eq!(result.execute_action, Some(Action::Unknown));
    }

    #[test]
    fn test_allowed_actions_keep_order_and_repeats() {
        let result = decode(&format!(
            "<command {NS}><actions><complete/><next/><prev/><next/></actions></command>"
        ))
        .unwrap();

        assert_eq!(
            result.allowed_actions,
            vec![Action::Complete, Action::Next, Action::Prev, Action::Next]
        );
        assert!(result.execute_action.is_none());
    }

    #[test]
    fn test_notes_in_document_order() {
        let result = decode(&format!(
            r#"<command {NS}><note>first</note><note type="error">second</note><note type="weird">third</note></command>"#
        ))
        .unwrap();

        assert_eq!(
            result.notes,
            vec![
                Note::new(NoteType::Info, "first"),
                Note::new(NoteType::Error, "second"),
                Note::new(NoteType::Info, "third"),
            ]
        );
    }

    #[test]
    fn test_note_text_whitespace_preserved() {
        let result = decode(&format!(
            "<command {NS}><note type=\"info\">  line one\n\tline two  </note></command>"
        ))
        .unwrap();
        assert_eq!(result.notes[0].text, "  line one\n\tline two  ");
    }

    #[test]
    fn test_note_with_child_element_fails() {
        let err = decode(&format!("<command {NS}><note>a<b/></note></command>")).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_form_is_decoded() {
        let result = decode(&format!(
            r#"<command {NS} node="config" status="executing">
                <actions execute="next"><next/></actions>
                <x xmlns="jabber:x:data" type="form">
                    <field var="max" type="text-single"><value>10</value></field>
                </x>
            </command>"#
        ))
        .unwrap();

        let form = result.form.unwrap();
        assert_eq!(form.form_type, FormType::Form);
        assert_eq!(form.field("max").and_then(|f| f.first_value()), Some("10"));
        assert_eq!(result.allowed_actions, vec![Action::Next]);
    }

    #[test]
    fn test_x_in_other_namespace_is_ignored() {
        let result = decode(&format!(
            r#"<command {NS}><x xmlns="jabber:x:oob"><url>http://example.org</url></x></command>"#
        ))
        .unwrap();
        assert!(result.form.is_none());
    }

    #[test]
    fn test_last_form_wins() {
        let result = decode(&format!(
            r#"<command {NS}>
                <x xmlns="jabber:x:data" type="form"/>
                <x xmlns="jabber:x:data" type="result"/>
            </command>"#
        ))
        .unwrap();
        assert_eq!(result.form.map(|f| f.form_type), Some(FormType::Result));
    }

    #[test]
    fn test_fields_inside_form_do_not_leak() {
        // <next/> inside the form subtree belongs to the form decoder.
        let result = decode(&format!(
            r#"<command {NS}><x xmlns="jabber:x:data" type="form"><next/></x></command>"#
        ))
        .unwrap();
        assert!(result.allowed_actions.is_empty());
    }

    #[test]
    fn test_error_is_decoded() {
        let result = decode(&format!(
            r#"<command {NS} node="config" status="canceled">
                <error type="modify">
                    <bad-request xmlns="urn:ietf:params:xml:ns:xmpp-stanzas"/>
                    <bad-action xmlns="http://jabber.org/protocol/commands"/>
                </error>
            </command>"#
        ))
        .unwrap();

        let error = result.error.unwrap();
        assert_eq!(error.error_type, Some(ErrorType::Modify));
        assert_eq!(error.condition, Some(Condition::BadRequest));
        assert_eq!(
            error.specific,
            Some(SpecificError::new(SpecificErrorCondition::BadAction))
        );
    }

    #[test]
    fn test_redirect_with_markup_does_not_abort_command() {
        let result = decode(&format!(
            r#"<command {NS} node="config" status="canceled">
                <error type="modify">
                    <redirect xmlns="urn:ietf:params:xml:ns:xmpp-stanzas"><uri>xmpp:b@example.org</uri></redirect>
                </error>
                <note>moved</note>
            </command>"#
        ))
        .unwrap();

        let error = result.error.unwrap();
        assert_eq!(error.condition, Some(Condition::Redirect));
        assert_eq!(error.condition_text, None);
        assert_eq!(result.notes, vec![Note::new(NoteType::Info, "moved")]);
    }

    #[test]
    fn test_unknown_children_are_ignored() {
        let result = decode(&format!(
            r#"<command {NS} status="completed"><extension xmlns="urn:example"><deep>text</deep></extension><note>ok</note></command>"#
        ))
        .unwrap();
        assert_eq!(result.notes, vec![Note::new(NoteType::Info, "ok")]);
    }

    #[test]
    fn test_nested_command_end_does_not_terminate() {
        let result = decode(&format!(
            r#"<command {NS}><wrapper><command/></wrapper><note>after</note></command>"#
        ))
        .unwrap();
        assert_eq!(result.notes.len(), 1);
    }

    #[test]
    fn test_stream_left_after_command() {
        let xml = format!(r#"<iq type="result"><command {NS} node="a"/><trailer/></iq>"#);
        let mut stream = XmlStream::from_xml(&xml);
        stream.next_start().unwrap();
        let start = stream.next_start().unwrap().unwrap();

        let result = CommandResultDecoder::new().decode(&mut stream, &start).unwrap();
        assert_eq!(result.node.as_deref(), Some("a"));
        assert_eq!(stream.next_start().unwrap().unwrap().name, "trailer");
    }

    #[test]
    fn test_unterminated_command_fails() {
        let err = decode(&format!(r#"<command {NS} status="executing"><note>half"#)).unwrap_err();
        assert!(err.is_structural());

        let err = decode(&format!(r#"<command {NS} status="executing">"#)).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_wrong_root_element() {
        let err = decode(r#"<query xmlns="jabber:iq:version"/>"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownElement { ref name, .. } if name == "query"));
    }

    #[test]
    fn test_decoding_is_deterministic() {
        let xml = format!(
            r#"<command {NS} sessionid="abc" node="n" status="executing" action="next">
                <actions execute="next"><next/><prev/></actions>
                <x xmlns="jabber:x:data" type="form"><title>T</title></x>
                <note type="warn">w</note>
            </command>"#
        );
        assert_eq!(decode(&xml).unwrap(), decode(&xml).unwrap());
    }
}
