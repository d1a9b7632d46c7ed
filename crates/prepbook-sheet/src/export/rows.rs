// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flatten extracted records into table rows.

use once_cell::sync::Lazy;
use prepbook_core::MathRendering;
use prepbook_document::docx::paragraph::strip_prefix;
use prepbook_document::{Paragraph, Part};
use regex::Regex;

use super::table::Table;
use crate::cq::extract::{CqRecord, labels_for};
use crate::cq::format::{SOLUTION_PREFIX, STEM_HEADER_PREFIX};
use crate::mcq::extract::McqRecord;
use crate::mcq::format::{EXPLANATION_PREFIX, SERIAL_PREFIX, answer_position, option_parts, without_tags};
use crate::text::{BANGLA_LABELS, clean_text};

static QUESTION_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[কখগঘ]\.\s*").unwrap());

/// Column names of the MCQ table.
pub const MCQ_COLUMNS: [&str; 10] = [
    "Serial",
    "Type",
    "Reference",
    "Question",
    "Option_ক",
    "Option_খ",
    "Option_গ",
    "Option_ঘ",
    "Answer_Label",
    "Explanation",
];

/// Type cell of every CQ row.
pub const CQ_TYPE: &str = "সৃজনশীল";

fn render(parts: Vec<Part>, rendering: MathRendering) -> String {
    Paragraph::new(parts).rendered(rendering)
}

/// One row per MCQ record.
pub fn mcq_table(paragraphs: &[Paragraph], records: &[McqRecord], rendering: MathRendering) -> Table {
    let mut table = Table::new(MCQ_COLUMNS);

    for record in records {
        let question = record
            .question
            .iter()
            .enumerate()
            .map(|(position, &index)| {
                let parts = &paragraphs[index].parts;
                let parts = if position == 0 {
                    strip_prefix(parts, &SERIAL_PREFIX)
                } else {
                    parts.clone()
                };
                render(without_tags(&parts), rendering)
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let options: Vec<Vec<Part>> = record
            .ordered_options()
            .into_iter()
            .map(|option| option_parts(&paragraphs[option.paragraph]))
            .collect();

        let answer_label = match answer_position(paragraphs, record, &options) {
            Some(position) => BANGLA_LABELS[position].to_string(),
            None => record
                .answer
                .as_ref()
                .and_then(|answer| answer.label.clone())
                .unwrap_or_default(),
        };

        let explanation = record
            .explanation
            .map(|index| render(strip_prefix(&paragraphs[index].parts, &EXPLANATION_PREFIX), rendering))
            .unwrap_or_default();

        let mut row = vec![
            record.serial.clone(),
            record.kind.label().to_string(),
            record.references.join(" "),
            question,
        ];
        for position in 0..BANGLA_LABELS.len() {
            row.push(
                options
                    .get(position)
                    .map(|parts| render(parts.clone(), rendering))
                    .unwrap_or_default(),
            );
        }
        row.push(answer_label);
        row.push(explanation);
        table.push_row(row.iter().map(|cell| clean_text(cell)).collect());
    }
    table
}

/// One row per CQ record, with a question and solution column per label.
pub fn cq_table(
    paragraphs: &[Paragraph],
    records: &[CqRecord],
    math_subject: bool,
    rendering: MathRendering,
) -> Table {
    let labels = labels_for(math_subject);
    let mut columns: Vec<String> = ["Serial", "Type", "Reference", "Stem"]
        .iter()
        .map(|name| name.to_string())
        .collect();
    for label in labels {
        columns.push(format!("Question_{label}"));
        columns.push(format!("Solution_{label}"));
    }
    let mut table = Table::new(columns);

    for record in records {
        let reference = record.reference.clone().unwrap_or_default();
        let stem = record
            .stem
            .iter()
            .enumerate()
            .map(|(position, &index)| {
                let parts = &paragraphs[index].parts;
                let parts = if position == 0 {
                    strip_prefix(parts, &STEM_HEADER_PREFIX)
                } else {
                    parts.clone()
                };
                let mut text = render(parts, rendering);
                if !reference.is_empty() && text.ends_with(&reference) {
                    text.truncate(text.len() - reference.len());
                }
                text
            })
            .collect::<Vec<_>>()
            .join(" ");

        let mut row = vec![record.serial.clone(), CQ_TYPE.to_string(), reference.clone(), stem];
        for label in labels {
            row.push(joined(paragraphs, record.questions.get(label), &QUESTION_PREFIX, rendering));
            row.push(joined(paragraphs, record.solutions.get(label), &SOLUTION_PREFIX, rendering));
        }
        table.push_row(row.iter().map(|cell| clean_text(cell)).collect());
    }
    table
}

/// Paragraphs rendered and joined, the first stripped of `prefix`.
fn joined(
    paragraphs: &[Paragraph],
    indices: Option<&Vec<usize>>,
    prefix: &Regex,
    rendering: MathRendering,
) -> String {
    let Some(indices) = indices else {
        return String::new();
    };
    indices
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            let parts = &paragraphs[index].parts;
            if position == 0 {
                render(strip_prefix(parts, prefix), rendering)
            } else {
                render(parts.clone(), rendering)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cq::extract::extract_cqs;
    use crate::mcq::extract::extract_mcqs;
    use crate::mcq::extract::tests::{FIXTURE, paragraphs};
    use prepbook_document::MathNode;

    #[test]
    fn mcq_rows_from_fixture() {
        let paragraphs = paragraphs(FIXTURE);
        let records = extract_mcqs(&paragraphs);
        let table = mcq_table(&paragraphs, &records, MathRendering::Latex);

        assert_eq!(table.len(), 3);
        assert_eq!(table.columns, MCQ_COLUMNS);
        assert_eq!(table.cell(0, "Serial"), Some("১"));
        assert_eq!(table.cell(0, "Type"), Some("সাধারণ"));
        assert_eq!(table.cell(0, "Reference"), Some("[ঢা. বো. ২৩]"));
        assert_eq!(table.cell(0, "Question"), Some("৫ এর গুণিতক কোনটি?"));
        assert_eq!(table.cell(0, "Option_খ"), Some("১৫"));
        assert_eq!(table.cell(0, "Answer_Label"), Some("খ"));
        assert_eq!(table.cell(0, "Explanation"), Some("১৫ = ৫ × ৩"));

        assert_eq!(table.cell(1, "Type"), Some("বহুপদী সমাপ্তিসূচক"));
        assert_eq!(
            table.cell(1, "Question"),
            Some("নিচের তথ্যগুলো লক্ষ কর: i. ২ মৌলিক সংখ্যা ii. ৯ যৌগিক সংখ্যা iii. ১ মৌলিক সংখ্যা নিচের কোনটি সঠিক?")
        );

        // Unlabelled answer resolved by content.
        assert_eq!(table.cell(2, "Option_ঘ"), Some("48 cm"));
        assert_eq!(table.cell(2, "Answer_Label"), Some("খ"));
        assert_eq!(table.cell(2, "Explanation"), Some(""));
    }

    #[test]
    fn equations_follow_the_rendering() {
        let xml = r#"<m:oMath xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math"><m:f><m:num><m:r><m:t>1</m:t></m:r></m:num><m:den><m:r><m:t>2</m:t></m:r></m:den></m:f></m:oMath>"#;
        let math = MathNode::parse(xml).unwrap();
        let paragraphs = vec![
            Paragraph::from_text("১. মান কত?"),
            Paragraph::new(vec![Part::Text("ক. ".into()), Part::Math(math)]),
            Paragraph::from_text("উত্তর: ক"),
        ];
        let records = extract_mcqs(&paragraphs);

        let latex = mcq_table(&paragraphs, &records, MathRendering::Latex);
        assert_eq!(latex.cell(0, "Option_ক"), Some(r"$\frac{1}{2}$"));

        let plain = mcq_table(&paragraphs, &records, MathRendering::Plain);
        assert_eq!(plain.cell(0, "Option_ক"), Some("12"));
    }

    #[test]
    fn cq_rows_from_fixture() {
        let paragraphs = paragraphs(crate::cq::extract::tests::FIXTURE);
        let records = extract_cqs(&paragraphs, false);
        let table = cq_table(&paragraphs, &records, false, MathRendering::Latex);

        assert_eq!(table.columns.len(), 4 + 8);
        assert_eq!(table.columns[4], "Question_ক");
        assert_eq!(table.columns[5], "Solution_ক");
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "Type"), Some(CQ_TYPE));
        assert_eq!(table.cell(0, "Reference"), Some("[ঢা. বো. ২৩]"));
        assert_eq!(
            table.cell(0, "Stem"),
            Some("একটি ত্রিভুজের তিন বাহু ৩, ৪ ও ৫ সেমি। চিত্রটি লক্ষ কর।")
        );
        assert_eq!(table.cell(0, "Question_ক"), Some("ত্রিভুজটির পরিসীমা কত?"));
        assert_eq!(table.cell(0, "Solution_খ"), Some("৩² + ৪² = ৫² সুতরাং ত্রিভুজটি সমকোণী।"));
        assert_eq!(table.cell(0, "Solution_ঘ"), Some(""));
        assert_eq!(table.cell(1, "Question_ক"), Some("লাভ কাকে বলে? লাভের সূত্র লেখ।"));
    }

    #[test]
    fn math_subject_has_three_label_columns() {
        let table = cq_table(&[], &[], true, MathRendering::Latex);
        assert_eq!(table.columns.len(), 4 + 6);
        assert!(table.is_empty());
    }
}
