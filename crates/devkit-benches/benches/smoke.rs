use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use devkit_benches::available_corpora;
use devkit_core::format::{format, minify};
use devkit_core::{compute_side_by_side, xml_to_json, RenderConfig};

fn bench_xml_to_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("xml-to-json");
    for corpus in available_corpora() {
        let dataset = corpus.load().expect("failed to load dataset");
        group.throughput(Throughput::Bytes(corpus.fixture_bytes() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(corpus.name()),
            &dataset,
            |b, dataset| {
                b.iter(|| {
                    let value = xml_to_json(dataset.original()).expect("corpus parses");
                    black_box(value);
                });
            },
        );
    }
    group.finish();
}

fn bench_json_to_xml(c: &mut Criterion) {
    let mut group = c.benchmark_group("json-to-xml");
    for corpus in available_corpora() {
        let dataset = corpus.load().expect("failed to load dataset");
        group.throughput(Throughput::Bytes(dataset.json().len() as u64));
        group.bench_function(corpus.name(), {
            let dataset = dataset.clone();
            move |b| {
                b.iter(|| {
                    let xml = dataset.json_to_xml().expect("corpus converts");
                    black_box(xml);
                });
            }
        });
    }
    group.finish();
}

fn bench_format(c: &mut Criterion) {
    {
        let mut pretty = c.benchmark_group("format");
        for corpus in available_corpora() {
            let dataset = corpus.load().expect("failed to load dataset");
            pretty.throughput(Throughput::Bytes(corpus.fixture_bytes() as u64));
            pretty.bench_function(corpus.name(), {
                let dataset = dataset.clone();
                move |b| {
                    b.iter(|| black_box(format(dataset.original())));
                }
            });
        }
        pretty.finish();
    }

    {
        let mut compact = c.benchmark_group("minify");
        for corpus in available_corpora() {
            let dataset = corpus.load().expect("failed to load dataset");
            let formatted = format(dataset.original());
            compact.throughput(Throughput::Bytes(formatted.len() as u64));
            compact.bench_function(corpus.name(), move |b| {
                b.iter(|| black_box(minify(&formatted)));
            });
        }
        compact.finish();
    }
}

fn bench_side_by_side(c: &mut Criterion) {
    let config = RenderConfig::default();
    let mut group = c.benchmark_group("side-by-side");
    for corpus in available_corpora() {
        let dataset = corpus.load().expect("failed to load dataset");
        let original = format(dataset.original());
        let modified = format(dataset.modified());
        group.throughput(Throughput::Elements(original.lines().count() as u64));
        group.bench_function(corpus.name(), move |b| {
            b.iter(|| {
                let view = compute_side_by_side(&original, &modified);
                black_box(view.render(&config));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_xml_to_json, bench_json_to_xml, bench_format, bench_side_by_side);
criterion_main!(benches);
