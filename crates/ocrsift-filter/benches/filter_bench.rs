// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the content filters on a synthetic multi-page
// document shaped like real OCR output.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ocrsift_filter::{ContentFilter, DjgFilter, HybridFilter};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Twenty pages of body text, chrome and noise, with a key-points section and a
/// trailing comment section when `with_key_points` is set.
fn synthetic_document(with_key_points: bool) -> String {
    let mut doc = String::new();
    for page in 1..=20 {
        doc.push_str(&format!("--- 第 {page} 页 ---\n"));
        if with_key_points && page == 1 {
            doc.push_str("划重点\n1、第一个要点的内容说明\n2、第二个要点的内容说明\n");
        }
        for _ in 0..15 {
            doc.push_str("这是一段很长的正文内容，讲述了事情的来龙去脉和各种细节。\n");
            doc.push_str("HOME ABOUT CONTACT LOGIN\n");
            doc.push_str("2023年5月12日\n\n");
        }
    }
    doc.push_str("最热留言\n写得真好\n");
    doc
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_filters(c: &mut Criterion) {
    let plain = synthetic_document(false);
    let key_points = synthetic_document(true);

    c.bench_function("hybrid conservative (20 pages)", |b| {
        let filter = HybridFilter::new();
        b.iter(|| black_box(filter.extract_main_content(black_box(&plain))));
    });

    c.bench_function("hybrid boundary-aware (20 pages)", |b| {
        let filter = HybridFilter::new();
        b.iter(|| black_box(filter.extract_main_content(black_box(&key_points))));
    });

    c.bench_function("djg (20 pages)", |b| {
        let filter = DjgFilter::new();
        b.iter(|| black_box(filter.extract_main_content(black_box(&plain))));
    });
}

criterion_group!(benches, bench_filters);
criterion_main!(benches);
