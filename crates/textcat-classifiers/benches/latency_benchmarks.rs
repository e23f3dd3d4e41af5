//! Latency benchmarks for prediction and text normalization
//!
//! Run with: cargo bench -p textcat-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::io::Write;
use tempfile::NamedTempFile;

use textcat_classifiers::{FastText, Trainer, TrainingConfig};
use textcat_core::normalize_text;

fn trained_model() -> FastText {
    let mut corpus = NamedTempFile::new().expect("Failed to create corpus file");
    for i in 0..2_000 {
        writeln!(corpus, "__label__positive markets rallied as shares rose {i}").unwrap();
        writeln!(corpus, "__label__negative the village lies on the river bank {i}").unwrap();
    }
    corpus.flush().unwrap();

    Trainer::new(TrainingConfig::default())
        .expect("Failed to create trainer")
        .train_file(corpus.path())
        .expect("Failed to train model")
}

/// Benchmark single-sample prediction with the production hyperparameters
fn benchmark_predict(c: &mut Criterion) {
    let model = trained_model();

    let test_cases = vec![
        ("short", "shares rose"),
        ("medium", "markets rallied after the central bank held rates steady on tuesday"),
        ("long", include_str!("../src/fasttext/mod.rs")),
    ];

    let mut group = c.benchmark_group("FastText_Predict");
    group.sample_size(100);

    for (name, text) in test_cases {
        group.bench_with_input(BenchmarkId::new("predict_top", name), &text, |b, text| {
            b.iter(|| model.predict_top(black_box(text)))
        });
    }

    group.finish();
}

/// Benchmark model loading, which happens on every score request
fn benchmark_load(c: &mut Criterion) {
    let model = trained_model();
    let file = NamedTempFile::new().unwrap();
    model.save(file.path()).unwrap();

    c.bench_function("model_load", |b| {
        b.iter(|| FastText::load(black_box(file.path())).unwrap())
    });
}

fn benchmark_normalize(c: &mut Criterion) {
    let text = "Caf\u{00E9}\u{00A0}\u{00A0}society  \t met on\n the \u{FB01}rst day.  ".repeat(20);
    c.bench_function("normalize_text", |b| b.iter(|| normalize_text(black_box(&text))));
}

criterion_group!(benches, benchmark_predict, benchmark_load, benchmark_normalize);
criterion_main!(benches);
