//! JSON pretty-printing, minification, statistics, and YAML interchange.
//!
//! Object key order is preserved exactly as it appears in the input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ConvertError;

/// Counts of each value kind in a JSON document, containers included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonStats {
    /// String values (object keys are not counted).
    pub strings: usize,
    /// Number values.
    pub numbers: usize,
    /// Boolean values.
    pub booleans: usize,
    /// Objects, including the root.
    pub objects: usize,
    /// Arrays, including the root.
    pub arrays: usize,
    /// `null` values.
    pub nulls: usize,
}

/// Parses JSON text and re-serializes it with two-space indentation.
///
/// ```
/// let pretty = devkit_core::format_json("{\"b\":1,\"a\":[true]}")?;
/// assert_eq!(pretty, "{\n  \"b\": 1,\n  \"a\": [\n    true\n  ]\n}");
/// # Ok::<(), devkit_core::ConvertError>(())
/// ```
pub fn format_json(input: &str) -> Result<String, ConvertError> {
    let value: Value = serde_json::from_str(input)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Parses JSON text and re-serializes it without insignificant whitespace.
///
/// ```
/// let compact = devkit_core::minify_json("{ \"a\" : [ 1, 2 ] }")?;
/// assert_eq!(compact, "{\"a\":[1,2]}");
/// # Ok::<(), devkit_core::ConvertError>(())
/// ```
pub fn minify_json(input: &str) -> Result<String, ConvertError> {
    let value: Value = serde_json::from_str(input)?;
    Ok(serde_json::to_string(&value)?)
}

/// Counts every value in the tree by kind.
///
/// ```
/// # use serde_json::json;
/// let stats = devkit_core::json_stats(&json!({"a": [1, "x", null], "b": false}));
/// assert_eq!(stats.objects, 1);
/// assert_eq!(stats.arrays, 1);
/// assert_eq!(stats.numbers, 1);
/// assert_eq!(stats.strings, 1);
/// assert_eq!(stats.nulls, 1);
/// assert_eq!(stats.booleans, 1);
/// ```
#[must_use]
pub fn json_stats(value: &Value) -> JsonStats {
    let mut stats = JsonStats::default();
    count(value, &mut stats);
    stats
}

fn count(value: &Value, stats: &mut JsonStats) {
    match value {
        Value::Null => stats.nulls += 1,
        Value::Bool(_) => stats.booleans += 1,
        Value::Number(_) => stats.numbers += 1,
        Value::String(_) => stats.strings += 1,
        Value::Array(items) => {
            stats.arrays += 1;
            items.iter().for_each(|item| count(item, stats));
        }
        Value::Object(map) => {
            stats.objects += 1;
            map.values().for_each(|item| count(item, stats));
        }
    }
}

/// Converts a YAML document to pretty-printed JSON.
///
/// ```
/// let json = devkit_core::yaml_to_json("name: devkit\ntags: [a, b]\n")?;
/// assert_eq!(json, "{\n  \"name\": \"devkit\",\n  \"tags\": [\n    \"a\",\n    \"b\"\n  ]\n}");
/// # Ok::<(), devkit_core::ConvertError>(())
/// ```
pub fn yaml_to_json(input: &str) -> Result<String, ConvertError> {
    let value: Value = serde_yaml::from_str(input)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Converts a JSON document to YAML.
///
/// ```
/// let yaml = devkit_core::json_to_yaml("{\"name\":\"devkit\",\"n\":1}")?;
/// assert_eq!(yaml, "name: devkit\nn: 1\n");
/// # Ok::<(), devkit_core::ConvertError>(())
/// ```
pub fn json_to_yaml(input: &str) -> Result<String, ConvertError> {
    let value: Value = serde_json::from_str(input)?;
    Ok(serde_yaml::to_string(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_rejects_invalid_json() {
        assert!(matches!(format_json("{\"a\":}"), Err(ConvertError::Json(_))));
    }

    #[test]
    fn minify_then_format_is_stable() {
        let input = "{\"z\": {\"y\": [1, 2.5, \"s\"]}, \"a\": null}";
        let pretty = format_json(input).unwrap();
        assert_eq!(format_json(&minify_json(&pretty).unwrap()).unwrap(), pretty);
    }

    #[test]
    fn stats_of_scalar_root() {
        let stats = json_stats(&Value::from("x"));
        assert_eq!(stats, JsonStats { strings: 1, ..JsonStats::default() });
    }

    #[test]
    fn yaml_errors_are_reported() {
        assert!(matches!(yaml_to_json("a: [1, 2"), Err(ConvertError::Yaml(_))));
    }
}
