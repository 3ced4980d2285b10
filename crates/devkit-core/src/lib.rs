//! Core text transforms behind the `devkit` command line tool.
//!
//! `devkit-core` converts between XML and JSON using the `@attribute` /
//! `#text` convention, pretty-prints and minifies XML, and lays out line
//! diffs as two aligned columns. Everything except the [`assist`] client is
//! synchronous and free of I/O.
//!
//! ```
//! use devkit_core::{compare_xml, format, json_text_to_xml, xml_to_json};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let value = xml_to_json("<book id=\"7\"><title>Dune</title></book>")?;
//!     assert_eq!(value, json!({"book": {"@id": "7", "title": "Dune"}}));
//!
//!     let xml = json_text_to_xml(&value.to_string())?;
//!     assert_eq!(xml, "<book id=\"7\"><title>Dune</title></book>");
//!
//!     assert_eq!(format::format(&xml), "<book id=\"7\">\n  <title>Dune</title>\n</book>");
//!
//!     let view = compare_xml(&xml, "<book id=\"8\"><title>Dune</title></book>")?;
//!     assert_eq!((view.deletions(), view.additions()), (1, 1));
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assist;
mod compare;
mod convert;
pub mod diff;
mod error;
pub mod format;
mod json;
mod size;
mod xml;

pub use compare::{compare_json, compare_xml, compare_xml_with};
pub use convert::{
    element_to_value, element_tree_to_json, json_text_to_xml, json_to_xml, xml_text_to_json,
    xml_to_json, ATTRIBUTE_PREFIX, DEFAULT_ITEM, DEFAULT_ROOT, TEXT_KEY,
};
pub use diff::{compute_side_by_side, RenderConfig, SideBySide};
pub use error::{AssistError, CompareError, ConvertError, ParseError};
pub use json::{format_json, json_stats, json_to_yaml, minify_json, yaml_to_json, JsonStats};
pub use size::{analyze_json, analyze_xml, format_bytes, JsonSizeReport, XmlSizeReport};
pub use xml::{validate_xml, XmlAttribute, XmlChild, XmlElement};

/// Returns the semantic version of the `devkit-core` crate.
///
/// ```
/// assert!(!devkit_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
