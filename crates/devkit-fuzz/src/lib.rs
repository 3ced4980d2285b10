//! Fuzzing harnesses for `devkit-core`.
//!
//! Each public function accepts raw bytes so it can back a `cargo fuzz`
//! target as well as a plain unit test. Recoverable errors (invalid XML,
//! invalid JSON) are ignored; broken invariants panic.
//!
//! # Examples
//!
//! ```
//! devkit_fuzz::fuzz_xml_parse(b"<a x=\"1\">text</a>");
//! devkit_fuzz::fuzz_convert_round_trip(&[7, 1, 2, 3, 4, 5]);
//! devkit_fuzz::fuzz_format(b"<a>\n  <b/>\n</a>");
//! devkit_fuzz::fuzz_diff(b"a\nb\0a\nc");
//! devkit_fuzz::fuzz_json(b"{\"a\":[1,null]}");
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::collections::BTreeSet;

use arbitrary::Unstructured;
use devkit_core::diff::{compute_side_by_side, normalize_newlines, split_lines};
use devkit_core::format::{format, minify, tokenize};
use devkit_core::{
    analyze_json, analyze_xml, element_tree_to_json, format_json, json_stats, json_text_to_xml,
    json_to_xml, minify_json, xml_to_json, XmlElement,
};

const MAX_DEPTH: usize = 4;
const MAX_CHILDREN: u8 = 4;
const MAX_ATTRIBUTES: u8 = 3;
const MAX_NAME_LEN: u8 = 6;
const MAX_TEXT_LEN: u8 = 12;

/// Parses arbitrary bytes as XML and converts whatever parses.
///
/// ```
/// devkit_fuzz::fuzz_xml_parse(b"<root><item>1</item><item>2</item></root>");
/// ```
pub fn fuzz_xml_parse(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = analyze_xml(text);
    if let Ok(element) = XmlElement::parse(text) {
        let value = element_tree_to_json(&element);
        let _ = json_to_xml(&value, None);
        let _ = XmlElement::parse(&element.to_xml_string());
    }
    let _ = xml_to_json(text);
}

/// Builds an element tree from the bytes and checks that converting it to
/// JSON and back preserves its structure.
///
/// Generated trees keep sibling names distinct and never mix text with child
/// elements, the shape for which the conversion is lossless.
///
/// ```
/// devkit_fuzz::fuzz_convert_round_trip(b"round trip seed");
/// ```
pub fn fuzz_convert_round_trip(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    let Ok(element) = random_element(&mut unstructured, 0) else {
        return;
    };

    let value = element_tree_to_json(&element);
    let Some((root, inner)) = value.as_object().and_then(|map| map.iter().next()) else {
        panic!("converted tree must be wrapped in its root tag");
    };
    let xml = json_to_xml(inner, Some(root.as_str()));
    let rebuilt = match XmlElement::parse(&xml) {
        Ok(rebuilt) => rebuilt,
        Err(err) => panic!("{xml} does not parse: {err}"),
    };
    assert!(element.structurally_eq(&rebuilt), "{element} became {xml}");

    let text = value.to_string();
    let from_text = json_text_to_xml(&text).unwrap_or_else(|err| panic!("{text}: {err}"));
    assert_eq!(from_text, xml);
}

/// Runs the formatter and minifier over arbitrary text.
///
/// ```
/// devkit_fuzz::fuzz_format(b"<?xml version=\"1.0\"?><a><!-- c --><b/></a>");
/// ```
pub fn fuzz_format(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let once = minify(text);
    assert_eq!(minify(&once), once, "minify must be idempotent");

    let tokens = tokenize(text);
    let rebuilt: String = tokens.iter().map(|token| token.as_str()).collect();
    assert_eq!(rebuilt, text, "tokens must cover the input exactly");

    let _ = format(text);
}

/// Splits the bytes at the first NUL into two texts and diffs them.
///
/// ```
/// devkit_fuzz::fuzz_diff(b"one\ntwo\0one\n2");
/// ```
pub fn fuzz_diff(data: &[u8]) {
    let (left, right) = match data.iter().position(|byte| *byte == 0) {
        Some(split) => (&data[..split], &data[split + 1..]),
        None => (data, &[][..]),
    };
    let (Ok(original), Ok(modified)) = (std::str::from_utf8(left), std::str::from_utf8(right))
    else {
        return;
    };

    let view = compute_side_by_side(original, modified);
    assert_eq!(view.left.len(), view.right.len(), "columns must stay aligned");

    for (column, source) in [(&view.left, original), (&view.right, modified)] {
        let texts: Vec<&str> = column
            .iter()
            .filter(|line| !line.is_placeholder())
            .map(|line| line.text.as_str())
            .collect();
        assert_eq!(texts, split_lines(&normalize_newlines(source)));

        let numbers: Vec<usize> = column.iter().filter_map(|line| line.number).collect();
        assert!(numbers.windows(2).all(|pair| pair[0] + 1 == pair[1]));
    }
}

/// Runs the JSON tools over arbitrary bytes.
///
/// ```
/// devkit_fuzz::fuzz_json(b"[1, \"two\", {\"three\": null}]");
/// ```
pub fn fuzz_json(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        assert!(format_json(text).is_err(), "formatter accepted input serde_json rejects");
        return;
    };
    let (Ok(pretty), Ok(compact)) = (format_json(text), minify_json(text)) else {
        panic!("valid JSON must format and minify");
    };
    assert_eq!(serde_json::from_str::<serde_json::Value>(&pretty).ok(), Some(value.clone()));
    assert_eq!(minify_json(&pretty).ok().as_deref(), Some(compact.as_str()));

    let stats = json_stats(&value);
    let containers = stats.objects + stats.arrays;
    assert!(containers > 0 || !text.trim_start().starts_with(['{', '[']));

    if let Ok(report) = analyze_json(text) {
        let parts = report.keys
            + report.strings
            + report.numbers
            + report.booleans
            + report.nulls
            + report.syntax;
        assert_eq!(parts, report.total);
    }
    let _ = json_text_to_xml(text);
}

fn random_element(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<XmlElement, arbitrary::Error> {
    let mut element = XmlElement::new(random_name(unstructured)?);
    let attributes = unstructured.int_in_range::<u8>(0..=MAX_ATTRIBUTES)?;
    for _ in 0..attributes {
        element = element.with_attribute(random_name(unstructured)?, random_text(unstructured)?);
    }

    if depth >= MAX_DEPTH || unstructured.arbitrary::<bool>()? {
        if unstructured.arbitrary::<bool>()? {
            element = element.with_text(random_text(unstructured)?);
        }
        return Ok(element);
    }

    let mut seen = BTreeSet::new();
    let children = unstructured.int_in_range::<u8>(1..=MAX_CHILDREN)?;
    for _ in 0..children {
        let child = random_element(unstructured, depth + 1)?;
        if seen.insert(child.name().to_string()) {
            element = element.with_child(child);
        }
    }
    Ok(element)
}

fn random_name(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    let len = usize::from(unstructured.int_in_range::<u8>(1..=MAX_NAME_LEN)?);
    let mut name = String::with_capacity(len);
    for _ in 0..len {
        let byte = unstructured.int_in_range::<u8>(b'a'..=b'z')?;
        name.push(char::from(byte));
    }
    Ok(name)
}

fn random_text(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_TEXT_LEN)?);
    let mut text = String::with_capacity(len);
    for _ in 0..len {
        let byte = unstructured.int_in_range::<u8>(0x20..=0x7e)?;
        text.push(char::from(byte));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_parse_harness_handles_invalid_utf8() {
        fuzz_xml_parse(&[0xff, 0xfe, b'<']);
    }

    #[test]
    fn round_trip_harness_runs_on_many_seeds() {
        for seed in 0u8..=255 {
            let data: Vec<u8> = (0..64).map(|i| seed.wrapping_mul(31).wrapping_add(i)).collect();
            fuzz_convert_round_trip(&data);
        }
    }

    #[test]
    fn format_harness_runs() {
        fuzz_format(b"<a>  <b>t</b> <!-- > --> <![CDATA[ <x> ]]></a> <oops");
    }

    #[test]
    fn diff_harness_runs() {
        fuzz_diff(b"a\r\nb\nc\0a\nx\nc\n");
        fuzz_diff(b"");
    }

    #[test]
    fn json_harness_runs() {
        fuzz_json(b"{\"k\": [1.5, -2, true, \"s\\\"\"]}");
        fuzz_json(b"not json");
        fuzz_json(b" [ ] ");
    }
}
