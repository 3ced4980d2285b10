//! Bidirectional XML ⇄ JSON structural conversion.
//!
//! Elements map to JSON objects using the `@attr` / `#text` convention:
//! attributes become `"@name"` keys, direct text becomes `"#text"`, and each
//! child tag becomes a key whose value turns into a list on its second
//! occurrence. Text-only elements collapse to bare strings and empty
//! elements to `""`.
//!
//! Mixed content is lossy: all text runs of an element are merged into one
//! `"#text"` entry and lose their position relative to child elements.

use quick_xml::escape::{escape, partial_escape};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{ConvertError, ParseError, XmlChild, XmlElement};

/// Key prefix used for attributes.
pub const ATTRIBUTE_PREFIX: &str = "@";
/// Key used for text content.
pub const TEXT_KEY: &str = "#text";
/// Root tag used when JSON input has no single top-level key.
pub const DEFAULT_ROOT: &str = "root";
/// Element name for entries of a top-level or nested JSON array.
pub const DEFAULT_ITEM: &str = "item";

/// Parses XML text and converts it to a JSON value keyed by the root tag.
///
/// ```
/// # use serde_json::json;
/// let value = devkit_core::xml_to_json("<root id=\"1\"><item>value</item></root>")?;
/// assert_eq!(value, json!({"root": {"@id": "1", "item": "value"}}));
/// # Ok::<(), devkit_core::ParseError>(())
/// ```
pub fn xml_to_json(xml: &str) -> Result<Value, ParseError> {
    let root = XmlElement::parse(xml)?;
    Ok(element_tree_to_json(&root))
}

/// Converts an already parsed tree, wrapping it as `{ rootTag: ... }`.
#[must_use]
pub fn element_tree_to_json(root: &XmlElement) -> Value {
    let mut wrapper = Map::new();
    wrapper.insert(root.name().to_string(), element_to_value(root));
    Value::Object(wrapper)
}

/// Converts a single element to its JSON form, without the root wrapper.
///
/// ```
/// # use devkit_core::{element_to_value, XmlElement};
/// # use serde_json::json;
/// let element = XmlElement::parse("<a><b>1</b><b>2</b></a>")?;
/// assert_eq!(element_to_value(&element), json!({"b": ["1", "2"]}));
/// # Ok::<(), devkit_core::ParseError>(())
/// ```
#[must_use]
pub fn element_to_value(element: &XmlElement) -> Value {
    let mut map = Map::new();

    for attr in element.attributes() {
        map.insert(format!("{ATTRIBUTE_PREFIX}{}", attr.name), Value::String(attr.value.clone()));
    }

    for child in element.children() {
        match child {
            XmlChild::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match map.get_mut(TEXT_KEY) {
                    Some(Value::String(existing)) => {
                        existing.push(' ');
                        existing.push_str(text);
                    }
                    _ => {
                        map.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
                    }
                }
            }
            XmlChild::Element(child) => {
                insert_child(&mut map, child.name(), element_to_value(child));
            }
        }
    }

    if map.is_empty() {
        return Value::String(String::new());
    }
    if map.len() == 1 {
        if let Some(Value::String(text)) = map.get(TEXT_KEY) {
            return Value::String(text.clone());
        }
    }
    Value::Object(map)
}

fn insert_child(map: &mut Map<String, Value>, name: &str, value: Value) {
    match map.get_mut(name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name.to_string(), value);
        }
    }
}

/// Serializes a JSON value as XML.
///
/// With a tag, scalars become `<tag>value</tag>` and objects become an
/// element whose `@` keys are attributes, whose `#text` key is text, and
/// whose other keys are child elements (one sibling per list entry). A list
/// nested in a list becomes one element holding an `<item>` per entry.
/// Without a tag, scalars are stringified and objects emit only their
/// children. Text and attribute values are entity-escaped.
///
/// ```
/// # use serde_json::json;
/// let xml = devkit_core::json_to_xml(&json!({"@id": "1", "item": ["a", "b"]}), Some("root"));
/// assert_eq!(xml, "<root id=\"1\"><item>a</item><item>b</item></root>");
/// ```
#[must_use]
pub fn json_to_xml(value: &Value, tag: Option<&str>) -> String {
    let mut out = String::new();
    write_value(value, tag, &mut out);
    out
}

fn write_value(value: &Value, tag: Option<&str>, out: &mut String) {
    match value {
        Value::Object(map) => write_object(map, tag, out),
        Value::Array(items) => {
            for item in items {
                match (item, tag) {
                    (Value::Array(_), Some(tag)) => {
                        open_tag(tag, "", out);
                        write_value(item, Some(DEFAULT_ITEM), out);
                        close_tag(tag, out);
                    }
                    _ => write_value(item, tag, out),
                }
            }
        }
        scalar => {
            let text = scalar_text(scalar);
            match tag {
                Some(tag) => {
                    open_tag(tag, "", out);
                    out.push_str(&partial_escape(&text));
                    close_tag(tag, out);
                }
                None => out.push_str(&partial_escape(&text)),
            }
        }
    }
}

fn write_object(map: &Map<String, Value>, tag: Option<&str>, out: &mut String) {
    let mut attributes = String::new();
    let mut children = String::new();

    for (key, value) in map {
        if let Some(name) = key.strip_prefix(ATTRIBUTE_PREFIX) {
            attributes.push(' ');
            attributes.push_str(name);
            attributes.push_str("=\"");
            attributes.push_str(&escape(&scalar_text(value)));
            attributes.push('"');
        } else if key == TEXT_KEY {
            children.push_str(&partial_escape(&scalar_text(value)));
        } else {
            write_value(value, Some(key.as_str()), &mut children);
        }
    }

    match tag {
        Some(tag) => {
            open_tag(tag, &attributes, out);
            out.push_str(&children);
            close_tag(tag, out);
        }
        None => out.push_str(&children),
    }
}

fn open_tag(tag: &str, attributes: &str, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push_str(attributes);
    out.push('>');
}

fn close_tag(tag: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Parses JSON text and serializes it as an XML document.
///
/// A single-key top-level object supplies the root tag; anything else is
/// wrapped in `<root>`, with top-level array entries written as `<item>`.
///
/// ```
/// let xml = devkit_core::json_text_to_xml("{\"note\": {\"to\": \"Tove\"}}")?;
/// assert_eq!(xml, "<note><to>Tove</to></note>");
/// let wrapped = devkit_core::json_text_to_xml("{\"a\": 1, \"b\": 2}")?;
/// assert_eq!(wrapped, "<root><a>1</a><b>2</b></root>");
/// # Ok::<(), devkit_core::ConvertError>(())
/// ```
pub fn json_text_to_xml(json: &str) -> Result<String, ConvertError> {
    let value: Value = serde_json::from_str(json)?;
    let single_key =
        value.as_object().filter(|map| map.len() == 1).and_then(|map| map.iter().next());
    let xml = match (single_key, &value) {
        (Some((root, inner)), _) => json_to_xml(inner, Some(root.as_str())),
        (None, Value::Array(_)) => {
            let mut wrapper = Map::new();
            wrapper.insert(DEFAULT_ITEM.to_string(), value.clone());
            json_to_xml(&Value::Object(wrapper), Some(DEFAULT_ROOT))
        }
        (None, _) => json_to_xml(&value, Some(DEFAULT_ROOT)),
    };
    debug!(bytes = xml.len(), "converted JSON text to XML");
    Ok(xml)
}

/// Parses XML text and returns pretty-printed JSON (two-space indent).
pub fn xml_text_to_json(xml: &str) -> Result<String, ConvertError> {
    let value = xml_to_json(xml)?;
    let json = serde_json::to_string_pretty(&value)?;
    debug!(bytes = json.len(), "converted XML text to JSON");
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_only_element_collapses_to_string() {
        assert_eq!(xml_to_json("<a>hello</a>").unwrap(), json!({"a": "hello"}));
    }

    #[test]
    fn empty_element_becomes_empty_string() {
        assert_eq!(xml_to_json("<a/>").unwrap(), json!({"a": ""}));
        assert_eq!(xml_to_json("<a>   </a>").unwrap(), json!({"a": ""}));
    }

    #[test]
    fn repeated_children_promote_to_list() {
        let value = xml_to_json("<a><b>1</b><b>2</b><b>3</b></a>").unwrap();
        assert_eq!(value, json!({"a": {"b": ["1", "2", "3"]}}));
    }

    #[test]
    fn repeated_empty_children_are_promoted() {
        let value = xml_to_json("<a><b/><b/></a>").unwrap();
        assert_eq!(value, json!({"a": {"b": ["", ""]}}));
    }

    #[test]
    fn mixed_content_joins_text_runs() {
        let value = xml_to_json("<p>Hello <b>big</b> world</p>").unwrap();
        assert_eq!(value, json!({"p": {"#text": "Hello world", "b": "big"}}));
    }

    #[test]
    fn attributes_come_before_children_in_key_order() {
        let value = xml_to_json("<a k=\"v\"><z>1</z><y>2</y></a>").unwrap();
        let keys: Vec<&str> = value["a"].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["@k", "z", "y"]);
    }

    #[test]
    fn json_to_xml_scalars() {
        assert_eq!(json_to_xml(&json!(5), Some("n")), "<n>5</n>");
        assert_eq!(json_to_xml(&json!(true), None), "true");
        assert_eq!(json_to_xml(&json!(null), Some("x")), "<x>null</x>");
    }

    #[test]
    fn json_to_xml_escapes_reserved_characters() {
        let xml = json_to_xml(&json!({"@q": "a\"b", "#text": "1 < 2 & 3"}), Some("t"));
        assert_eq!(xml, "<t q=\"a&quot;b\">1 &lt; 2 &amp; 3</t>");
        let back = xml_to_json(&xml).unwrap();
        assert_eq!(back, json!({"t": {"@q": "a\"b", "#text": "1 < 2 & 3"}}));
    }

    #[test]
    fn json_to_xml_without_tag_drops_attributes() {
        let xml = json_to_xml(&json!({"@id": "1", "a": "x"}), None);
        assert_eq!(xml, "<a>x</a>");
    }

    #[test]
    fn top_level_array_repeats_tag() {
        assert_eq!(json_to_xml(&json!([1, 2]), Some("i")), "<i>1</i><i>2</i>");
        let wrapped = json_text_to_xml("[1, 2]").unwrap();
        assert_eq!(wrapped, "<root><item>1</item><item>2</item></root>");
    }

    #[test]
    fn nested_arrays_keep_their_grouping() {
        let xml = json_to_xml(&json!({"a": [[1, 2], [3]]}), Some("r"));
        assert_eq!(xml, "<r><a><item>1</item><item>2</item></a><a><item>3</item></a></r>");
        let back = xml_to_json(&xml).unwrap();
        assert_eq!(back, json!({"r": {"a": [{"item": ["1", "2"]}, {"item": "3"}]}}));

        let wrapped = json_text_to_xml("[[1], 2]").unwrap();
        assert_eq!(wrapped, "<root><item><item>1</item></item><item>2</item></root>");
    }

    #[test]
    fn json_text_to_xml_rejects_invalid_json() {
        let err = json_text_to_xml("{not json").unwrap_err();
        assert!(matches!(err, ConvertError::Json(_)));
    }

    #[test]
    fn xml_text_to_json_pretty_prints() {
        let json = xml_text_to_json("<a><b>1</b></a>").unwrap();
        assert_eq!(json, "{\n  \"a\": {\n    \"b\": \"1\"\n  }\n}");
    }
}
