//! Pull-based XML event stream with namespace resolution.
//!
//! Wraps [`quick_xml::NsReader`] and hands out owned events so decoders can
//! hold on to a start tag while they keep pulling from the same stream.

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::{DecodeError, Result};

/// An element start tag with its resolved namespace and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Local name without prefix (e.g., "command").
    pub name: String,
    /// Resolved namespace URI, empty when the element is unqualified.
    pub namespace: String,
    /// Unescaped attribute values keyed by qualified attribute name.
    pub attributes: HashMap<String, String>,
}

impl StartTag {
    /// Create a start tag without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            attributes: HashMap::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Get an attribute value.
    ///
    /// # Examples
    /// ```
    /// use xmpp_adhoc_commands::xml::StartTag;
    ///
    /// let tag = StartTag::new("note", "").with_attribute("type", "warn");
    /// assert_eq!(tag.attribute("type"), Some("warn"));
    /// assert_eq!(tag.attribute("missing"), None);
    /// ```
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Check the local name and namespace together.
    #[must_use]
    pub fn is(&self, name: &str, namespace: &str) -> bool {
        self.name == name && self.namespace == namespace
    }
}

/// A single event pulled from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Element start. Empty elements produce a start followed by an end.
    Start(StartTag),
    /// Element end.
    End { name: String, namespace: String },
    /// Character data, entities resolved. CDATA sections are reported as text.
    Text(String),
    /// End of input.
    Eof,
}

/// Streaming XML reader shared by all decoders.
pub struct XmlStream<R> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    depth: usize,
}

impl<'a> XmlStream<&'a [u8]> {
    /// Create a stream over an in-memory document.
    #[must_use]
    pub fn from_xml(xml: &'a str) -> Self {
        Self::new(xml.as_bytes())
    }
}

impl<R: BufRead> XmlStream<R> {
    /// Create a stream over any buffered reader.
    pub fn new(input: R) -> Self {
        let mut reader = NsReader::from_reader(input);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.trim_text(false);
        Self {
            reader,
            buf: Vec::new(),
            depth: 0,
        }
    }

    /// Current element nesting depth (0 outside any element).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Pull the next event.
    ///
    /// Comments, processing instructions, declarations and doctypes are skipped.
    pub fn next_event(&mut self) -> Result<XmlEvent> {
        let decoder = self.reader.decoder();
        loop {
            self.buf.clear();
            let (resolved, event) = self.reader.read_resolved_event_into(&mut self.buf)?;
            let namespace = namespace_uri(&resolved);

            match event {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    let mut attributes = HashMap::new();
                    for attr in e.attributes() {
                        let attr = attr?;
                        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                        let value = attr.unescape_value()?.into_owned();
                        attributes.insert(key, value);
                    }
                    self.depth += 1;
                    return Ok(XmlEvent::Start(StartTag {
                        name,
                        namespace,
                        attributes,
                    }));
                }
                Event::End(e) => {
                    self.depth = self.depth.saturating_sub(1);
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    return Ok(XmlEvent::End { name, namespace });
                }
                Event::Text(e) => return Ok(XmlEvent::Text(e.unescape()?.into_owned())),
                Event::CData(e) => {
                    let text = decoder.decode(&e).map_err(quick_xml::Error::from)?;
                    return Ok(XmlEvent::Text(text.into_owned()));
                }
                Event::Eof => return Ok(XmlEvent::Eof),
                _ => continue,
            }
        }
    }

    /// Pull events until the first start tag, skipping prolog and whitespace.
    ///
    /// Returns `None` when the input holds no element.
    pub fn next_start(&mut self) -> Result<Option<StartTag>> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(tag) => return Ok(Some(tag)),
                XmlEvent::Eof => return Ok(None),
                XmlEvent::End { .. } | XmlEvent::Text(_) => continue,
            }
        }
    }

    /// Read the text content of `start` through its end tag.
    ///
    /// Must be called right after `start` was pulled. Text and CDATA pieces
    /// are concatenated untouched; a nested element is an error.
    pub fn read_text(&mut self, start: &StartTag) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                XmlEvent::Text(piece) => text.push_str(&piece),
                XmlEvent::End { .. } => return Ok(text),
                XmlEvent::Start(found) => {
                    return Err(DecodeError::UnexpectedElement {
                        parent: start.name.clone(),
                        found: found.name,
                    })
                }
                XmlEvent::Eof => {
                    return Err(DecodeError::UnexpectedEof {
                        element: start.name.clone(),
                    })
                }
            }
        }
    }

    /// Consume the remainder of `start`'s subtree, including its end tag.
    ///
    /// Must be called right after `start` was pulled.
    pub fn skip_element(&mut self, start: &StartTag) -> Result<()> {
        let target = self.depth.saturating_sub(1);
        loop {
            match self.next_event()? {
                XmlEvent::End { .. } if self.depth == target => return Ok(()),
                XmlEvent::Eof => {
                    return Err(DecodeError::UnexpectedEof {
                        element: start.name.clone(),
                    })
                }
                _ => continue,
            }
        }
    }
}

fn namespace_uri(resolved: &ResolveResult<'_>) -> String {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => String::from_utf8_lossy(uri).into_owned(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_start_tag_resolves_default_namespace() {
        let mut stream = XmlStream::from_xml(r#"<command xmlns="urn:test" node="n"/>"#);
        let tag = stream.next_start().unwrap().unwrap();

        assert_eq!(tag.name, "command");
        assert_eq!(tag.namespace, "urn:test");
        assert_eq!(tag.attribute("node"), Some("n"));
        assert!(tag.is("command", "urn:test"));
    }

    #[test]
    fn test_prefixed_element_uses_local_name() {
        let mut stream = XmlStream::from_xml(r#"<c:command xmlns:c="urn:test"/>"#);
        let tag = stream.next_start().unwrap().unwrap();

        assert_eq!(tag.name, "command");
        assert_eq!(tag.namespace, "urn:test");
    }

    #[test]
    fn test_unqualified_element_has_empty_namespace() {
        let mut stream = XmlStream::from_xml("<root/>");
        let tag = stream.next_start().unwrap().unwrap();
        assert_eq!(tag.namespace, "");
    }

    #[test]
    fn test_empty_element_expands_to_start_and_end() {
        let mut stream = XmlStream::from_xml("<a><b/></a>");

        assert!(matches!(stream.next_event().unwrap(), XmlEvent::Start(t) if t.name == "a"));
        assert!(matches!(stream.next_event().unwrap(), XmlEvent::Start(t) if t.name == "b"));
        assert_eq!(stream.depth(), 2);
        assert!(matches!(stream.next_event().unwrap(), XmlEvent::End { name, .. } if name == "b"));
        assert!(matches!(stream.next_event().unwrap(), XmlEvent::End { name, .. } if name == "a"));
        assert_eq!(stream.depth(), 0);
        assert_eq!(stream.next_event().unwrap(), XmlEvent::Eof);
    }

    #[test]
    fn test_next_start_skips_prolog() {
        let mut stream =
            XmlStream::from_xml("<?xml version='1.0'?>\n<!-- comment -->\n<root/>");
        let tag = stream.next_start().unwrap().unwrap();
        assert_eq!(tag.name, "root");
    }

    #[test]
    fn test_next_start_on_empty_input() {
        let mut stream = XmlStream::from_xml("   ");
        assert!(stream.next_start().unwrap().is_none());
    }

    #[test]
    fn test_attribute_entities_are_unescaped() {
        let mut stream = XmlStream::from_xml(r#"<note text="a &amp; b"/>"#);
        let tag = stream.next_start().unwrap().unwrap();
        assert_eq!(tag.attribute("text"), Some("a & b"));
    }

    #[test]
    fn test_read_text_preserves_whitespace_and_entities() {
        let mut stream = XmlStream::from_xml("<note>  one &lt;two&gt;\n three </note>");
        let tag = stream.next_start().unwrap().unwrap();

        let text = stream.read_text(&tag).unwrap();
        assert_eq!(text, "  one <two>\n three ");
        assert_eq!(stream.depth(), 0);
    }

    #[test]
    fn test_read_text_joins_cdata() {
        let mut stream = XmlStream::from_xml("<note>a<![CDATA[<b>]]>c</note>");
        let tag = stream.next_start().unwrap().unwrap();
        assert_eq!(stream.read_text(&tag).unwrap(), "a<b>c");
    }

    #[test]
    fn test_read_text_empty_element() {
        let mut stream = XmlStream::from_xml("<note/>");
        let tag = stream.next_start().unwrap().unwrap();
        assert_eq!(stream.read_text(&tag).unwrap(), "");
    }

    #[test]
    fn test_read_text_rejects_child_element() {
        let mut stream = XmlStream::from_xml("<note>text<b>bold</b></note>");
        let tag = stream.next_start().unwrap().unwrap();

        let err = stream.read_text(&tag).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedElement { ref parent, ref found } if parent == "note" && found == "b"
        ));
    }

    #[test]
    fn test_skip_element_consumes_subtree() {
        let mut stream = XmlStream::from_xml("<root><skip><a><b/></a>text</skip><next/></root>");
        stream.next_start().unwrap();
        let skip = stream.next_start().unwrap().unwrap();

        stream.skip_element(&skip).unwrap();
        assert_eq!(stream.depth(), 1);

        let next = stream.next_start().unwrap().unwrap();
        assert_eq!(next.name, "next");
    }

    #[test]
    fn test_skip_element_truncated_input() {
        let mut stream = XmlStream::from_xml("<root><skip><a>");
        stream.next_start().unwrap();
        let skip = stream.next_start().unwrap().unwrap();

        assert!(stream.skip_element(&skip).is_err());
    }

    #[test]
    fn test_mismatched_end_tag_is_error() {
        let mut stream = XmlStream::from_xml("<a></b>");
        stream.next_start().unwrap();
        assert!(matches!(stream.next_event(), Err(DecodeError::Xml(_))));
    }
}
