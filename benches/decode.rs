//! Benchmarks for the MOBI decoding pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use mobidoc::mobi::palmdoc;
use mobidoc::parse_mobi;

#[path = "../tests/common/mod.rs"]
mod common;

use common::{BookBuilder, CODEPAGE_UTF8, COMPRESSION_PALMDOC};

/// Repetitive prose markup split into numbered chapters.
fn sample_markup(chapters: usize) -> String {
    let paragraph = "<p>It is a truth universally acknowledged, that a single man in \
                     possession of a good fortune, must be in want of a wife.</p>\n";
    let mut markup = String::from("<html><head><style>p { margin: 0 }</style></head><body>");
    for i in 1..=chapters {
        markup.push_str(&format!("<h1>Chapter {i}</h1>\n"));
        for _ in 0..40 {
            markup.push_str(paragraph);
        }
    }
    markup.push_str("</body></html>");
    markup
}

/// Build a PalmDOC-compressed book with 4096-byte text records.
fn sample_book(chapters: usize) -> Vec<u8> {
    let markup = sample_markup(chapters);
    let mut builder = BookBuilder::new("Bench_Book")
        .compression(COMPRESSION_PALMDOC)
        .mobi(CODEPAGE_UTF8)
        .title(b"Benchmark Book")
        .exth(100, b"Jane Austen");
    for chunk in markup.as_bytes().chunks(4096) {
        builder = builder.compressed_record(chunk);
    }
    builder.build()
}

// ============================================================================
// PalmDOC Benchmarks
// ============================================================================

fn bench_palmdoc(c: &mut Criterion) {
    let markup = sample_markup(2);
    let record = &markup.as_bytes()[..4096.min(markup.len())];
    let compressed = palmdoc::compress(record);

    c.bench_function("palmdoc_compress_record", |b| {
        b.iter(|| palmdoc::compress(black_box(record)));
    });

    c.bench_function("palmdoc_decompress_record", |b| {
        b.iter(|| palmdoc::decompress(black_box(&compressed)));
    });
}

// ============================================================================
// Full Parse Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let small = sample_book(5);
    let large = sample_book(80);

    c.bench_function("parse_mobi_small", |b| {
        b.iter(|| parse_mobi(black_box(&small)).unwrap());
    });

    c.bench_function("parse_mobi_large", |b| {
        b.iter(|| parse_mobi(black_box(&large)).unwrap());
    });
}

criterion_group!(benches, bench_palmdoc, bench_parse);
criterion_main!(benches);
