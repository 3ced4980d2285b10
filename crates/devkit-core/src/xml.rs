//! In-memory XML document model.
//!
//! Documents are parsed with `quick-xml` into an immutable tree of
//! [`XmlElement`] values. Comments, processing instructions, and the XML
//! declaration are dropped; CDATA sections become ordinary text.

use std::fmt;

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::ParseError;

/// A single `name="value"` pair on an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Attribute name, including any namespace prefix.
    pub name: String,
    /// Unescaped attribute value.
    pub value: String,
}

/// Content of an element, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlChild {
    /// A nested element.
    Element(XmlElement),
    /// A run of unescaped character data (whitespace preserved).
    Text(String),
}

/// An XML element with ordered attributes and ordered mixed children.
///
/// ```
/// # use devkit_core::XmlElement;
/// let root = XmlElement::parse("<root id=\"1\"><item>value</item></root>")?;
/// assert_eq!(root.name(), "root");
/// assert_eq!(root.attribute("id"), Some("1"));
/// assert_eq!(root.elements().next().unwrap().text_content(), "value");
/// # Ok::<(), devkit_core::ParseError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlChild>,
}

impl XmlElement {
    /// Creates an empty element with the given tag name.
    #[must_use]
    pub fn new<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self { name: name.into(), attributes: Vec::new(), children: Vec::new() }
    }

    /// Sets an attribute, replacing an existing attribute of the same name.
    #[must_use]
    pub fn with_attribute<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(XmlAttribute { name, value }),
        }
        self
    }

    /// Appends a text run.
    #[must_use]
    pub fn with_text<S>(mut self, text: S) -> Self
    where
        S: Into<String>,
    {
        self.children.push(XmlChild::Text(text.into()));
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlChild::Element(child));
        self
    }

    /// Tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Looks up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|attr| attr.name == name).map(|attr| attr.value.as_str())
    }

    /// Children in document order.
    #[must_use]
    pub fn children(&self) -> &[XmlChild] {
        &self.children
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> + '_ {
        self.children.iter().filter_map(|child| match child {
            XmlChild::Element(element) => Some(element),
            XmlChild::Text(_) => None,
        })
    }

    /// Trimmed, non-empty text runs directly under this element.
    pub fn text_runs(&self) -> impl Iterator<Item = &str> + '_ {
        self.children.iter().filter_map(|child| match child {
            XmlChild::Text(text) => Some(text.trim()).filter(|text| !text.is_empty()),
            XmlChild::Element(_) => None,
        })
    }

    /// All direct text runs joined with a single space.
    ///
    /// Interleaving with child elements is not represented.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.text_runs().collect::<Vec<_>>().join(" ")
    }

    /// Parses a complete XML document and returns its root element.
    ///
    /// ```
    /// # use devkit_core::{ParseError, XmlElement};
    /// assert!(XmlElement::parse("<a><b></a>").is_err());
    /// assert_eq!(XmlElement::parse("   "), Err(ParseError::MissingRoot));
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(input);
        reader.check_comments(true);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|err| syntax_error(&reader, err))?;
            match event {
                Event::Start(start) => {
                    let element = open_element(&reader, &start)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = open_element(&reader, &start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let Some(element) = stack.pop() else {
                        return Err(syntax_error(&reader, "closing tag without an open element"));
                    };
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if text.windows(3).any(|window| window == b"]]>") {
                        return Err(syntax_error(&reader, "`]]>` is not allowed in text"));
                    }
                    let text = text.unescape().map_err(|err| syntax_error(&reader, err))?;
                    push_text(&mut stack, text.into_owned())?;
                }
                Event::CData(data) => {
                    push_text(&mut stack, String::from_utf8_lossy(&data).into_owned())?;
                }
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.pop() {
            return Err(ParseError::Unclosed { name: open.name });
        }
        let root = root.ok_or(ParseError::MissingRoot)?;
        trace!(root = %root.name, "parsed XML document");
        Ok(root)
    }

    /// Serializes the element compactly, escaping text and attribute values.
    ///
    /// Elements without children are written self-closing.
    ///
    /// ```
    /// # use devkit_core::XmlElement;
    /// let element = XmlElement::new("a").with_attribute("q", "\"x\"").with_text("1 < 2");
    /// assert_eq!(element.to_xml_string(), "<a q=\"&quot;x&quot;\">1 &lt; 2</a>");
    /// ```
    #[must_use]
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attributes {
            out.push(' ');
            out.push_str(&attr.name);
            out.push_str("=\"");
            out.push_str(&escape(&attr.value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlChild::Element(element) => element.write_into(out),
                XmlChild::Text(text) => out.push_str(&partial_escape(text)),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Compares two trees ignoring formatting whitespace and attribute order.
    ///
    /// Tag names, attribute sets, joined text content, and the ordered list
    /// of child elements must all match.
    ///
    /// ```
    /// # use devkit_core::XmlElement;
    /// let a = XmlElement::parse("<a x=\"1\" y=\"2\">\n  <b>t</b>\n</a>")?;
    /// let b = XmlElement::parse("<a y=\"2\" x=\"1\"><b> t </b></a>")?;
    /// assert!(a.structurally_eq(&b));
    /// # Ok::<(), devkit_core::ParseError>(())
    /// ```
    #[must_use]
    pub fn structurally_eq(&self, other: &Self) -> bool {
        if self.name != other.name || self.text_content() != other.text_content() {
            return false;
        }
        if sorted_attributes(self) != sorted_attributes(other) {
            return false;
        }
        let lhs: Vec<&XmlElement> = self.elements().collect();
        let rhs: Vec<&XmlElement> = other.elements().collect();
        lhs.len() == rhs.len() && lhs.iter().zip(rhs.iter()).all(|(a, b)| a.structurally_eq(b))
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}

/// Checks that `input` is a well-formed XML document.
///
/// ```
/// assert!(devkit_core::validate_xml("<ok/>").is_ok());
/// assert!(devkit_core::validate_xml("<a></b>").is_err());
/// ```
pub fn validate_xml(input: &str) -> Result<(), ParseError> {
    XmlElement::parse(input).map(|_| ())
}

fn sorted_attributes(element: &XmlElement) -> Vec<(&str, &str)> {
    let mut attrs: Vec<(&str, &str)> =
        element.attributes.iter().map(|attr| (attr.name.as_str(), attr.value.as_str())).collect();
    attrs.sort_unstable();
    attrs
}

fn open_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<XmlElement, ParseError> {
    let mut element = XmlElement::new(checked_name(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(|err| syntax_error(reader, err))?;
        let value =
            attr.decode_and_unescape_value(reader).map_err(|err| syntax_error(reader, err))?;
        let name = checked_name(attr.key.as_ref())?;
        element.attributes.push(XmlAttribute { name, value: value.into_owned() });
    }
    Ok(element)
}

fn checked_name(raw: &[u8]) -> Result<String, ParseError> {
    let name = String::from_utf8_lossy(raw).into_owned();
    if is_xml_name(&name) {
        Ok(name)
    } else {
        Err(ParseError::InvalidName { name })
    }
}

/// Whether `name` matches the XML 1.0 `Name` production.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlChild::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::MultipleRoots { name: element.name });
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: String) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            if !text.is_empty() {
                parent.children.push(XmlChild::Text(text));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::StrayText),
    }
}

fn syntax_error<E>(reader: &Reader<&[u8]>, err: E) -> ParseError
where
    E: fmt::Display,
{
    ParseError::Syntax { position: reader.buffer_position(), message: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attributes_text_and_children() {
        let root = XmlElement::parse(
            "<?xml version=\"1.0\"?><!-- c --><a x=\"1\">hi<b y=\"&amp;\"/>there</a>",
        )
        .unwrap();
        assert_eq!(root.name(), "a");
        assert_eq!(root.attribute("x"), Some("1"));
        assert_eq!(root.text_content(), "hi there");
        let child = root.elements().next().unwrap();
        assert_eq!(child.name(), "b");
        assert_eq!(child.attribute("y"), Some("&"));
    }

    #[test]
    fn cdata_becomes_text() {
        let root = XmlElement::parse("<a><![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(root.text_content(), "<raw>");
    }

    #[test]
    fn rejects_mismatched_end_tag() {
        let err = XmlElement::parse("<a><b></a></b>").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got {err:?}");
    }

    #[test]
    fn rejects_unclosed_root() {
        let err = XmlElement::parse("<a><b></b>").unwrap_err();
        assert_eq!(err, ParseError::Unclosed { name: "a".to_string() });
    }

    #[test]
    fn rejects_second_root() {
        let err = XmlElement::parse("<a/><b/>").unwrap_err();
        assert_eq!(err, ParseError::MultipleRoots { name: "b".to_string() });
    }

    #[test]
    fn rejects_text_outside_root() {
        assert_eq!(XmlElement::parse("<a/>tail").unwrap_err(), ParseError::StrayText);
        assert_eq!(XmlElement::parse("plain text").unwrap_err(), ParseError::StrayText);
    }

    #[test]
    fn rejects_duplicate_attributes() {
        assert!(XmlElement::parse("<a x=\"1\" x=\"2\"/>").is_err());
    }

    #[test]
    fn rejects_names_outside_the_name_production() {
        assert_eq!(
            XmlElement::parse("<1a/>").unwrap_err(),
            ParseError::InvalidName { name: "1a".to_string() }
        );
        assert_eq!(
            XmlElement::parse("<a -x=\"1\"/>").unwrap_err(),
            ParseError::InvalidName { name: "-x".to_string() }
        );
        assert!(XmlElement::parse("<ns:a-b.c_d x.y=\"1\" \u{e9}t\u{e9}=\"2\"/>").is_ok());
    }

    #[test]
    fn rejects_double_hyphen_in_comment() {
        let err = XmlElement::parse("<a><!-- a -- b --></a>").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got {err:?}");
        assert!(XmlElement::parse("<a><!-- a - b --></a>").is_ok());
    }

    #[test]
    fn rejects_cdata_terminator_in_text() {
        let err = XmlElement::parse("<a>]]></a>").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got {err:?}");
        let root = XmlElement::parse("<a>]]&gt;</a>").unwrap();
        assert_eq!(root.text_content(), "]]>");
    }

    #[test]
    fn serialization_reparses_to_equal_tree() {
        let element = XmlElement::new("doc")
            .with_attribute("title", "a \"b\" & <c>")
            .with_child(XmlElement::new("p").with_text("x < y & z"))
            .with_child(XmlElement::new("empty"));
        let reparsed = XmlElement::parse(&element.to_xml_string()).unwrap();
        assert_eq!(reparsed, element);
    }

    #[test]
    fn structural_equality_detects_differences() {
        let base = XmlElement::parse("<a><b/><c/></a>").unwrap();
        let swapped = XmlElement::parse("<a><c/><b/></a>").unwrap();
        let extra_attr = XmlElement::parse("<a k=\"v\"><b/><c/></a>").unwrap();
        assert!(!base.structurally_eq(&swapped));
        assert!(!base.structurally_eq(&extra_attr));
        assert!(base.structurally_eq(&base.clone()));
    }

    #[test]
    fn with_attribute_replaces_existing_value() {
        let element = XmlElement::new("a").with_attribute("k", "1").with_attribute("k", "2");
        assert_eq!(element.attributes().len(), 1);
        assert_eq!(element.attribute("k"), Some("2"));
    }
}
