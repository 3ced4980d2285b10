//! Generated corpora for the `devkit` benchmarks.
//!
//! Each corpus is a deterministic book catalog of a fixed size, available as
//! an original and a lightly edited XML document plus the JSON form of the
//! original. Nothing is read from disk.
//!
//! # Examples
//!
//! ```
//! let corpus = devkit_benches::available_corpora()
//!     .iter()
//!     .find(|corpus| corpus.name() == "catalog-10")
//!     .expect("registered corpus");
//! let dataset = corpus.load()?;
//! assert!(dataset.json().starts_with("{\n  \"catalog\""));
//! # Ok::<(), devkit_core::ConvertError>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fmt::Write as _;

use devkit_core::{
    compare_xml, json_text_to_xml, validate_xml, xml_text_to_json, CompareError, ConvertError,
    RenderConfig, SideBySide,
};

/// Every seventh record has its price changed in the edited document.
const EDIT_STRIDE: usize = 7;

static CORPORA: [Corpus; 3] = [
    Corpus { name: "catalog-10", records: 10 },
    Corpus { name: "catalog-200", records: 200 },
    Corpus { name: "catalog-2000", records: 2000 },
];

/// Returns the registered corpora, smallest first.
#[must_use]
pub fn available_corpora() -> &'static [Corpus] {
    &CORPORA
}

/// A named, generated benchmark input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corpus {
    name: &'static str,
    records: usize,
}

impl Corpus {
    /// Stable identifier used as the benchmark parameter.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of `<book>` records in the catalog.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    /// Size of the original XML document in bytes.
    #[must_use]
    pub fn fixture_bytes(&self) -> usize {
        catalog_xml(self.records, false).len()
    }

    /// Generates the documents and checks that both are well-formed.
    pub fn load(&self) -> Result<Dataset, ConvertError> {
        let original = catalog_xml(self.records, false);
        let modified = catalog_xml(self.records, true);
        validate_xml(&original)?;
        validate_xml(&modified)?;
        let json = xml_text_to_json(&original)?;
        Ok(Dataset { original, modified, json })
    }
}

/// The documents generated for one corpus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dataset {
    original: String,
    modified: String,
    json: String,
}

impl Dataset {
    /// Compact original catalog.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Compact catalog with some prices changed.
    #[must_use]
    pub fn modified(&self) -> &str {
        &self.modified
    }

    /// Pretty-printed JSON conversion of [`Dataset::original`].
    #[must_use]
    pub fn json(&self) -> &str {
        &self.json
    }

    /// Formats both catalogs and diffs them.
    pub fn compare(&self) -> Result<SideBySide, CompareError> {
        compare_xml(&self.original, &self.modified)
    }

    /// Converts the JSON form back to XML.
    pub fn json_to_xml(&self) -> Result<String, ConvertError> {
        json_text_to_xml(&self.json)
    }

    /// Renders a side-by-side view of the two catalogs.
    pub fn render_side_by_side(&self, config: &RenderConfig) -> Result<String, CompareError> {
        Ok(self.compare()?.render(config))
    }
}

fn catalog_xml(records: usize, edited: bool) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><catalog>");
    for index in 0..records {
        let mut cents = 500 + (index * 37) % 4500;
        if edited && index % EDIT_STRIDE == 0 {
            cents += 100;
        }
        let _ = write!(
            xml,
            "<book id=\"bk{index:05}\" lang=\"{lang}\"><title>Volume {index} &amp; notes</title>\
             <price currency=\"EUR\">{euros}.{cents:02}</price>\
             <tags><tag>t{first}</tag><tag>t{second}</tag></tags></book>",
            lang = if index % 3 == 0 { "de" } else { "en" },
            euros = cents / 100,
            cents = cents % 100,
            first = index % 5,
            second = (index + 1) % 5,
        );
    }
    xml.push_str("</catalog>");
    xml
}
