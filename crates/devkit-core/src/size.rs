//! Byte-size breakdowns of XML and JSON payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::{tokenize, Token};
use crate::ConvertError;

/// Where the bytes of an XML document go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlSizeReport {
    /// UTF-8 length of the whole input.
    pub total: usize,
    /// Tag markup, excluding attribute pairs.
    pub tags: usize,
    /// `name="value"` attribute pairs.
    pub attributes: usize,
    /// Character data between tags, trimmed at both ends of the document.
    pub content: usize,
    /// Comments, delimiters included.
    pub comments: usize,
}

/// Where the bytes of a minified JSON document go.
///
/// The parts always add up to `total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSizeReport {
    /// Length of the minified serialization.
    pub total: usize,
    /// Object keys, quotes and escapes included.
    pub keys: usize,
    /// String values, quotes and escapes included.
    pub strings: usize,
    /// Number literals.
    pub numbers: usize,
    /// `true` / `false` literals.
    pub booleans: usize,
    /// `null` literals.
    pub nulls: usize,
    /// Brackets, braces, commas, and colons.
    pub syntax: usize,
}

/// Splits an XML document into tag, attribute, content, and comment bytes.
///
/// This is a lexical estimate and does not require well-formed input.
///
/// ```
/// let report = devkit_core::analyze_xml("<a id=\"1\"><!--c-->hi</a>");
/// assert_eq!(report.total, 24);
/// assert_eq!(report.attributes, 6);
/// assert_eq!(report.tags, 8);
/// assert_eq!(report.comments, 8);
/// assert_eq!(report.content, 2);
/// ```
#[must_use]
pub fn analyze_xml(input: &str) -> XmlSizeReport {
    let mut report = XmlSizeReport { total: input.len(), ..XmlSizeReport::default() };
    let mut text = String::new();

    for token in tokenize(input) {
        match token {
            Token::Text(run) => text.push_str(run),
            markup if markup.is_comment() => report.comments += markup.as_str().len(),
            tag => {
                let tag = tag.as_str();
                let attributes = attribute_bytes(tag);
                report.attributes += attributes;
                report.tags += tag.len() - attributes;
            }
        }
    }

    report.content = text.trim().len();
    report
}

fn attribute_bytes(tag: &str) -> usize {
    let bytes = tag.as_bytes();
    let mut total = 0;
    let mut search_from = 0;

    while let Some(offset) = tag[search_from..].find('=') {
        let eq = search_from + offset;
        let name_start = tag[..eq]
            .rfind(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-' || c == ':' || c == '.'))
            .map_or(0, |pos| pos + 1);
        search_from = eq + 1;
        let Some(&quote) = bytes.get(eq + 1).filter(|b| **b == b'"' || **b == b'\'') else {
            continue;
        };
        let Some(close) = tag[eq + 2..].find(char::from(quote)) else {
            break;
        };
        let value_end = eq + 2 + close + 1;
        if name_start < eq {
            total += value_end - name_start;
        }
        search_from = value_end;
    }

    total
}

/// Analyzes the minified form of a JSON document.
///
/// ```
/// let report = devkit_core::analyze_json("{ \"a\": [1, true, null, \"x\"] }")?;
/// assert_eq!(report.total, 23);
/// assert_eq!(report.keys, 3);
/// assert_eq!(report.strings, 3);
/// assert_eq!(report.numbers, 1);
/// assert_eq!(report.booleans, 4);
/// assert_eq!(report.nulls, 4);
/// assert_eq!(report.syntax, 8);
/// # Ok::<(), devkit_core::ConvertError>(())
/// ```
pub fn analyze_json(input: &str) -> Result<JsonSizeReport, ConvertError> {
    let value: Value = serde_json::from_str(input)?;
    let minified = serde_json::to_string(&value)?;
    let mut report = JsonSizeReport { total: minified.len(), ..JsonSizeReport::default() };
    walk(&value, &mut report)?;
    Ok(report)
}

fn walk(value: &Value, report: &mut JsonSizeReport) -> Result<(), ConvertError> {
    match value {
        Value::Null => report.nulls += 4,
        Value::Bool(true) => report.booleans += 4,
        Value::Bool(false) => report.booleans += 5,
        Value::Number(number) => report.numbers += number.to_string().len(),
        Value::String(text) => report.strings += serde_json::to_string(text)?.len(),
        Value::Array(items) => {
            report.syntax += 2 + items.len().saturating_sub(1);
            for item in items {
                walk(item, report)?;
            }
        }
        Value::Object(map) => {
            report.syntax += 2 + map.len().saturating_sub(1) + map.len();
            for (key, item) in map {
                report.keys += serde_json::to_string(key)?.len();
                walk(item, report)?;
            }
        }
    }
    Ok(())
}

/// Formats a byte count using binary units (`B`, `KB`, `MB`, `GB`).
///
/// ```
/// assert_eq!(devkit_core::format_bytes(0), "0 B");
/// assert_eq!(devkit_core::format_bytes(512), "512 B");
/// assert_eq!(devkit_core::format_bytes(1536), "1.5 KB");
/// assert_eq!(devkit_core::format_bytes(3 * 1024 * 1024), "3 MB");
/// ```
#[must_use]
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}
