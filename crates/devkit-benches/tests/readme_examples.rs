use devkit_benches::available_corpora;
use devkit_core::RenderConfig;

#[test]
fn devkit_benches_readme_example() -> Result<(), Box<dyn std::error::Error>> {
    let corpus =
        available_corpora().iter().find(|c| c.name() == "catalog-10").expect("registered corpus");
    let dataset = corpus.load()?;
    let view = dataset.compare()?;
    assert!(!view.is_identical());

    let rendered = dataset.render_side_by_side(&RenderConfig::default())?;
    println!("{rendered}");
    assert!(rendered.contains(" - "));
    assert!(rendered.contains(" + "));
    Ok(())
}
