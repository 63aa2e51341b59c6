//! Data form decoding (XEP-0004).
//!
//! Command responses carry their input and output fields as an embedded
//! `<x xmlns="jabber:x:data"/>` element. The command decoder hands that
//! subtree to [`FormDecoder`] and stores the result untouched.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::config::DATA_FORM_NAMESPACE;
use crate::error::{DecodeError, Result};
use crate::registry::ElementDecoder;
use crate::xml::{StartTag, XmlEvent, XmlStream};

/// Purpose of a data form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FormType {
    /// Form to be filled in.
    Form,
    /// Filled-in form.
    Submit,
    /// The form-processing entity cancelled the form.
    Cancel,
    /// Result data.
    Result,
}

/// Type of a form field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FieldType {
    Boolean,
    Fixed,
    Hidden,
    JidMulti,
    JidSingle,
    ListMulti,
    ListSingle,
    TextMulti,
    TextPrivate,
    TextSingle,
}

/// Selectable option of a list field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: String,
}

/// A single form field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormField {
    /// Field identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var: Option<String>,

    /// Human-readable label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Field type. `None` when absent; XEP-0004 then implies `text-single`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,

    /// Natural-language description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the field must be filled in.
    #[serde(default)]
    pub required: bool,

    /// Values in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Options in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

impl FormField {
    /// First value of the field, if any.
    #[must_use]
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// A decoded data form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataForm {
    #[serde(rename = "type")]
    pub form_type: FormType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormField>,

    /// Column definitions of a multi-item result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported: Option<Vec<FormField>>,

    /// Rows of a multi-item result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Vec<FormField>>,
}

impl DataForm {
    /// Create an empty form of the given type.
    #[must_use]
    pub fn new(form_type: FormType) -> Self {
        Self {
            form_type,
            title: None,
            instructions: Vec::new(),
            fields: Vec::new(),
            reported: None,
            items: Vec::new(),
        }
    }

    /// Find a field by its `var`.
    #[must_use]
    pub fn field(&self, var: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.var.as_deref() == Some(var))
    }
}

/// Children of `<x/>` the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormChild {
    Title,
    Instructions,
    Field,
    Reported,
    Item,
}

impl FormChild {
    fn classify(tag: &StartTag) -> Option<Self> {
        if tag.namespace != DATA_FORM_NAMESPACE {
            return None;
        }
        match tag.name.as_str() {
            "title" => Some(Self::Title),
            "instructions" => Some(Self::Instructions),
            "field" => Some(Self::Field),
            "reported" => Some(Self::Reported),
            "item" => Some(Self::Item),
            _ => None,
        }
    }
}

/// Decoder for `<x xmlns="jabber:x:data"/>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormDecoder;

impl FormDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ElementDecoder for FormDecoder {
    type Output = DataForm;

    /// Decode a data form.
    ///
    /// # Errors
    /// `InvalidFormType` when `type` is missing or not one of the four form
    /// types; structural errors from the stream.
    fn decode<R: BufRead>(&self, stream: &mut XmlStream<R>, start: &StartTag) -> Result<DataForm> {
        let type_attr = start.attribute("type");
        let form_type = type_attr
            .and_then(|t| t.parse::<FormType>().ok())
            .ok_or_else(|| DecodeError::InvalidFormType(type_attr.map(String::from)))?;

        let mut form = DataForm::new(form_type);

        loop {
            match stream.next_event()? {
                XmlEvent::Start(child) => match FormChild::classify(&child) {
                    Some(FormChild::Title) => form.title = Some(stream.read_text(&child)?),
                    Some(FormChild::Instructions) => {
                        form.instructions.push(stream.read_text(&child)?);
                    }
                    Some(FormChild::Field) => form.fields.push(decode_field(stream, &child)?),
                    Some(FormChild::Reported) => {
                        form.reported = Some(decode_field_list(stream, &child)?);
                    }
                    Some(FormChild::Item) => form.items.push(decode_field_list(stream, &child)?),
                    None => {
                        tracing::trace!(element = %child.name, "Skipping unknown data form child");
                        stream.skip_element(&child)?;
                    }
                },
                XmlEvent::End { .. } => break,
                XmlEvent::Text(_) => {}
                XmlEvent::Eof => {
                    return Err(DecodeError::UnexpectedEof {
                        element: start.name.clone(),
                    })
                }
            }
        }

        Ok(form)
    }
}

/// Decode the `<field/>` children of `<reported/>` or `<item/>`.
fn decode_field_list<R: BufRead>(
    stream: &mut XmlStream<R>,
    start: &StartTag,
) -> Result<Vec<FormField>> {
    let mut fields = Vec::new();
    loop {
        match stream.next_event()? {
            XmlEvent::Start(child) if child.is("field", DATA_FORM_NAMESPACE) => {
                fields.push(decode_field(stream, &child)?);
            }
            XmlEvent::Start(child) => stream.skip_element(&child)?,
            XmlEvent::End { .. } => return Ok(fields),
            XmlEvent::Text(_) => {}
            XmlEvent::Eof => {
                return Err(DecodeError::UnexpectedEof {
                    element: start.name.clone(),
                })
            }
        }
    }
}

fn decode_field<R: BufRead>(stream: &mut XmlStream<R>, start: &StartTag) -> Result<FormField> {
    let field_type = start.attribute("type").and_then(|t| {
        let parsed = t.parse::<FieldType>().ok();
        if parsed.is_none() {
            tracing::debug!(field_type = %t, "Unrecognised form field type");
        }
        parsed
    });

    let mut field = FormField {
        var: start.attribute("var").map(String::from),
        label: start.attribute("label").map(String::from),
        field_type,
        ..Default::default()
    };

    loop {
        match stream.next_event()? {
            XmlEvent::Start(child) if child.namespace == DATA_FORM_NAMESPACE => {
                match child.name.as_str() {
                    "desc" => field.description = Some(stream.read_text(&child)?),
                    "required" => {
                        field.required = true;
                        stream.skip_element(&child)?;
                    }
                    "value" => field.values.push(stream.read_text(&child)?),
                    "option" => field.options.push(decode_option(stream, &child)?),
                    _ => stream.skip_element(&child)?,
                }
            }
            XmlEvent::Start(child) => stream.skip_element(&child)?,
            XmlEvent::End { .. } => return Ok(field),
            XmlEvent::Text(_) => {}
            XmlEvent::Eof => {
                return Err(DecodeError::UnexpectedEof {
                    element: start.name.clone(),
                })
            }
        }
    }
}

fn decode_option<R: BufRead>(stream: &mut XmlStream<R>, start: &StartTag) -> Result<FieldOption> {
    let label = start.attribute("label").map(String::from);
    let mut value = String::new();
    loop {
        match stream.next_event()? {
            XmlEvent::Start(child) if child.is("value", DATA_FORM_NAMESPACE) => {
                value = stream.read_text(&child)?;
            }
            XmlEvent::Start(child) => stream.skip_element(&child)?,
            XmlEvent::End { .. } => return Ok(FieldOption { label, value }),
            XmlEvent::Text(_) => {}
            XmlEvent::Eof => {
                return Err(DecodeError::UnexpectedEof {
                    element: start.name.clone(),
                })
            }
        }
    }
}
