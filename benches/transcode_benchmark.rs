//! Benchmarks for plaintext transcoding performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic flat-text documents.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use plaintext::{ImageTable, RenderOptions};

/// Creates a synthetic flat-text document with the given number of sections.
fn create_test_document(section_count: usize) -> String {
    let mut lines = Vec::new();
    for i in 0..section_count {
        lines.push(format!("\\section{{Part {}}}", i + 1));
        lines.push(format!(
            "Some \\textbf{{bold}} text with $x_{} = {}$ and \\textit{{emphasis}} \\cite{{ref{}}}.",
            i, i, i
        ));
        lines.push(format!("$\\int_0^{} f(x)\\,dx$ \\label{{eq{}}}", i + 1, i));
        lines.push(format!("\\lemma{{L{}}} By \\eqref{{eq{}}} the claim holds.", i, i));
        lines.push("\\qed".to_string());
        lines.push(
            "$\\begin{table}A & \\mergeright[2]{B}\\\\ C & D & E\\end{table}$ Results".to_string(),
        );
        lines.push("\\python{def%20f(x)%3A%0A%20%20%20%20return%20x}".to_string());
        lines.push("\u{200B}".to_string());
    }
    lines.join("\n")
}

/// Benchmark tokenizing a single dense line.
fn bench_tokenize(c: &mut Criterion) {
    let line = "Let \\textbf{x} and $y^2$ with \\textit{z} and \\eqref{a}, \\cite{b}.".repeat(20);

    c.bench_function("tokenize_line", |b| {
        b.iter(|| plaintext::parser::tokenize(black_box(&line)).len());
    });
}

/// Benchmark parsing and serializing at various sizes.
fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");
    let images = ImageTable::new();

    for section_count in [1, 10, 100].iter() {
        let flat = create_test_document(*section_count);

        group.bench_function(format!("{}_sections", section_count), |b| {
            b.iter(|| {
                let doc = plaintext::parse(black_box(&flat), &images).unwrap();
                plaintext::serialize(&doc)
            });
        });
    }

    group.finish();
}

/// Benchmark LaTeX emission at various sizes.
fn bench_latex(c: &mut Criterion) {
    let mut group = c.benchmark_group("latex");
    let options = RenderOptions::new();

    for section_count in [1, 10, 100].iter() {
        let flat = create_test_document(*section_count);

        group.bench_function(format!("{}_sections", section_count), |b| {
            b.iter(|| plaintext::render::to_latex(black_box(&flat), &options).unwrap());
        });
    }

    group.finish();
}

/// Benchmark builder pattern overhead.
fn bench_builder_creation(c: &mut Criterion) {
    c.bench_function("builder_creation", |b| {
        b.iter(|| {
            let _builder = plaintext::Transcoder::new()
                .strict()
                .body_only()
                .with_cleanup(plaintext::CleanupPreset::Standard);
        });
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_round_trip,
    bench_latex,
    bench_builder_creation,
);
criterion_main!(benches);
