// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the prepbook-sheet crate: MCQ extraction and
// layout over a synthetic worksheet.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use prepbook_core::FormatConfig;
use prepbook_document::Paragraph;
use prepbook_sheet::{extract_mcqs, format_mcqs};

const BANGLA_DIGITS: [char; 10] = ['০', '১', '২', '৩', '৪', '৫', '৬', '৭', '৮', '৯'];

fn bangla_number(mut n: usize) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(BANGLA_DIGITS[n % 10]);
        n /= 10;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

/// A worksheet of `count` general questions with four short options, an
/// answer and an explanation each.
fn worksheet(count: usize) -> Vec<Paragraph> {
    let mut paragraphs = vec![Paragraph::from_text("নিচের প্রশ্নগুলোর উত্তর দাও")];
    for serial in 1..=count {
        let n = bangla_number(serial);
        paragraphs.push(Paragraph::from_text(format!("{n}. {n} এর দ্বিগুণ কত? [ঢা. বো. ২৩]")));
        for (label, value) in ["ক", "খ", "গ", "ঘ"].iter().zip(1..) {
            paragraphs.push(Paragraph::from_text(format!("{label}. {}", bangla_number(serial * value))));
        }
        paragraphs.push(Paragraph::from_text("উত্তর: খ"));
        paragraphs.push(Paragraph::from_text(format!("ব্যাখ্যা: {n} × ২ = {}", bangla_number(serial * 2))));
        paragraphs.push(Paragraph::default());
    }
    paragraphs
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Extraction over a 200-question worksheet (about 1,600 paragraphs).
fn bench_mcq_extraction(c: &mut Criterion) {
    let paragraphs = worksheet(200);

    c.bench_function("extract_mcqs (200 questions)", |b| {
        b.iter(|| {
            let records = extract_mcqs(black_box(&paragraphs));
            black_box(records.len());
        });
    });
}

/// Extraction plus layout of the same worksheet, without serialisation.
fn bench_mcq_format(c: &mut Criterion) {
    let paragraphs = worksheet(200);
    let config = FormatConfig::default();

    c.bench_function("format_mcqs (200 questions)", |b| {
        b.iter(|| {
            let records = extract_mcqs(&paragraphs);
            let writer = format_mcqs(black_box(&paragraphs), &records, &config);
            black_box(writer.blocks().len());
        });
    });
}

criterion_group!(benches, bench_mcq_extraction, bench_mcq_format);
criterion_main!(benches);
