use std::fs;
use std::path::{Path, PathBuf};

use devkit_core::{json_to_xml, xml_to_json, XmlElement};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Fixture {
    xml: String,
    json: Value,
}

fn load_fixture(path: &Path) -> Fixture {
    let data = fs::read_to_string(path).expect("fixture should be readable");
    serde_json::from_str(&data).expect("fixture should deserialize")
}

fn fixture_paths() -> Vec<PathBuf> {
    let fixtures_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/convert");
    let mut entries: Vec<_> = fs::read_dir(&fixtures_root)
        .expect("fixtures directory must exist")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort();

    assert!(
        !entries.is_empty(),
        "expected at least one conversion fixture under tests/fixtures/convert",
    );
    entries
}

#[test]
fn xml_to_json_golden_parity() {
    for path in fixture_paths() {
        let fixture = load_fixture(&path);
        let value = xml_to_json(&fixture.xml).expect("fixture XML parses");
        assert_eq!(value, fixture.json, "fixture {path:?}");
    }
}

#[test]
fn json_back_to_xml_is_structurally_equivalent() {
    for path in fixture_paths() {
        let fixture = load_fixture(&path);
        let (root, inner) = fixture
            .json
            .as_object()
            .and_then(|map| map.iter().next())
            .expect("fixture JSON has a root key");
        let xml = json_to_xml(inner, Some(root.as_str()));

        let original = XmlElement::parse(&fixture.xml).expect("fixture XML parses");
        let rebuilt = XmlElement::parse(&xml).expect("generated XML parses");
        assert!(original.structurally_eq(&rebuilt), "fixture {path:?} produced {xml}");
    }
}
