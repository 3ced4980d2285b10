//! Document comparison: normalize both sides, then diff them line by line.

use tracing::debug;

use crate::diff::{compute_side_by_side, SideBySide};
use crate::format::{format_with, FormatOptions};
use crate::json::format_json;
use crate::{validate_xml, CompareError, ConvertError};

/// Validates and pretty-prints two XML documents, then diffs the results.
///
/// ```
/// let view = devkit_core::compare_xml("<a><b>1</b></a>", "<a>\n<b>2</b>\n</a>")?;
/// assert_eq!(view.len(), 3);
/// assert_eq!(view.deletions(), 1);
/// # Ok::<(), devkit_core::CompareError>(())
/// ```
pub fn compare_xml(original: &str, modified: &str) -> Result<SideBySide, CompareError> {
    compare_xml_with(original, modified, &FormatOptions::default())
}

/// Like [`compare_xml`] with explicit formatting options.
pub fn compare_xml_with(
    original: &str,
    modified: &str,
    options: &FormatOptions,
) -> Result<SideBySide, CompareError> {
    validate_xml(original).map_err(|err| CompareError::Left(ConvertError::Xml(err)))?;
    validate_xml(modified).map_err(|err| CompareError::Right(ConvertError::Xml(err)))?;
    let left = format_with(original, options);
    let right = format_with(modified, options);
    let view = compute_side_by_side(&left, &right);
    debug!(rows = view.len(), "compared XML documents");
    Ok(view)
}

/// Pretty-prints two JSON documents, then diffs the results.
///
/// ```
/// let view = devkit_core::compare_json("{\"a\":1,\"b\":2}", "{\"a\":1,\"b\":3}")?;
/// assert_eq!(view.additions(), 1);
/// # Ok::<(), devkit_core::CompareError>(())
/// ```
pub fn compare_json(original: &str, modified: &str) -> Result<SideBySide, CompareError> {
    let left = format_json(original).map_err(CompareError::Left)?;
    let right = format_json(modified).map_err(CompareError::Right)?;
    let view = compute_side_by_side(&left, &right);
    debug!(rows = view.len(), "compared JSON documents");
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_differences_are_not_reported() {
        let view = compare_xml("<a><b>1</b></a>", "<a>\n    <b>1</b>\n</a>\n").unwrap();
        assert!(view.is_identical());
    }

    #[test]
    fn invalid_side_is_named() {
        let err = compare_xml("<a/>", "<a>").unwrap_err();
        assert!(matches!(err, CompareError::Right(ConvertError::Xml(_))));
        assert!(err.to_string().starts_with("modified document:"));

        let err = compare_json("{", "{}").unwrap_err();
        assert!(matches!(err, CompareError::Left(ConvertError::Json(_))));
    }

    #[test]
    fn json_key_order_is_preserved_in_comparison() {
        let view = compare_json("{\"a\":1,\"b\":2}", "{\"b\":2,\"a\":1}").unwrap();
        assert!(!view.is_identical());
    }
}
