//! Indexing performance benchmarks
//!
//! Measures performance of:
//! - Content hashing
//! - Chunking
//! - Classification
//! - Full and incremental reindex

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::path::Path;
use tempfile::TempDir;
use tulio_core::config::PrivacyConfig;
use tulio_core::index::{chunk, hash_content};
use tulio_core::{Config, Engine, PrivacyClassifier, PrivacyTier};

const SMALL_DOC: &str = "Grocery list: apples, bread, coffee.\nPick up dry cleaning.";

fn generate_notes(sections: usize) -> String {
    let mut doc = String::from("# Notes\n\n");
    for i in 0..sections {
        doc.push_str(&format!(
            "## Day {}\n\nMet with the garden club about irrigation plans for plot {}.\n\
             Budget questions remain open and the pump quote is still pending.\n\
             Follow up with the supplier before the end of the week.\n\n",
            i, i
        ));
    }
    doc
}

fn bench_content_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_hashing");

    let large = generate_notes(200);
    for (name, content) in [("small", SMALL_DOC), ("large", large.as_str())] {
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), content, |b, content| {
            b.iter(|| hash_content(black_box(content.as_bytes())));
        });
    }

    group.finish();
}

fn bench_chunking(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunking");

    let medium = generate_notes(20);
    let large = generate_notes(200);
    let single_line = "word ".repeat(20_000);
    for (name, content) in [
        ("medium", medium.as_str()),
        ("large", large.as_str()),
        ("single_line", single_line.as_str()),
    ] {
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), content, |b, content| {
            b.iter(|| chunk(black_box(content), 1000, 200));
        });
    }

    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let mut config = PrivacyConfig::default();
    for i in 0..50 {
        config
            .rules
            .prefixes
            .insert(format!("/home/user/dir{i}"), PrivacyTier::Internal);
    }
    config.rules.paths.insert("*/finance/*".into(), PrivacyTier::Sensitive);
    config.rules.extensions.insert(".md".into(), PrivacyTier::Public);
    let classifier = PrivacyClassifier::from_config(&config).unwrap();
    let sample = generate_notes(10);

    c.bench_function("classify/path_and_content", |b| {
        b.iter(|| {
            classifier.classify(
                black_box(Path::new("/home/user/dir42/finance/q3.md")),
                Some(black_box(sample.as_str())),
            )
        });
    });
}

fn bench_reindex(c: &mut Criterion) {
    let mut group = c.benchmark_group("reindex");
    group.sample_size(10);

    let temp = TempDir::new().unwrap();
    for i in 0..100 {
        std::fs::write(temp.path().join(format!("note{i}.md")), generate_notes(5)).unwrap();
    }

    group.bench_function("full_100_files", |b| {
        b.iter_batched(
            || Engine::open_in_memory(Config::for_root(temp.path())).unwrap(),
            |engine| engine.reindex(false).unwrap(),
            criterion::BatchSize::SmallInput,
        );
    });

    let engine = Engine::open_in_memory(Config::for_root(temp.path())).unwrap();
    engine.reindex(false).unwrap();
    group.bench_function("incremental_100_unchanged", |b| {
        b.iter(|| engine.reindex(false).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_content_hashing,
    bench_chunking,
    bench_classification,
    bench_reindex
);
criterion_main!(benches);
