// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CQ extraction — stems, labelled sub-questions and their solutions.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use prepbook_document::Paragraph;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::text::is_bangla_sign;

static STEM_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*প্রশ্ন\s+([০-৯0-9]+)\.").unwrap());

static QUESTION_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([কখগঘ])\.").unwrap());

static ANSWER_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*উত্তর\s*[:：ঃ]?\s*[(\[]?\s*([কখগঘ])").unwrap());

static TRAILING_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\[[^\[\]]*\])\s*$").unwrap());

/// Sub-question labels of a math paper.
pub const MATH_LABELS: [char; 3] = ['ক', 'খ', 'গ'];

/// Sub-question labels of every other paper.
pub const GENERAL_LABELS: [char; 4] = ['ক', 'খ', 'গ', 'ঘ'];

/// One creative question: a stem, its sub-questions and their solutions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CqRecord {
    pub serial: String,
    /// Stem paragraphs; the first one carries the `প্রশ্ন N.` header.
    pub stem: Vec<usize>,
    /// Board or school tag closing the stem, e.g. `[ঢা. বো. ২৩]`.
    pub reference: Option<String>,
    pub questions: BTreeMap<char, Vec<usize>>,
    pub solutions: BTreeMap<char, Vec<usize>>,
}

impl CqRecord {
    /// Labels with a question or a solution, in label order.
    pub fn labels(&self) -> Vec<char> {
        let mut labels: Vec<char> = self
            .questions
            .keys()
            .chain(self.solutions.keys())
            .copied()
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }
}

/// Sub-question labels in use for a paper.
pub fn labels_for(math_subject: bool) -> &'static [char] {
    if math_subject { &MATH_LABELS } else { &GENERAL_LABELS }
}

/// Serial of a `প্রশ্ন N.` header line.
pub fn stem_serial(line: &str) -> Option<&str> {
    STEM_HEADER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|serial| serial.as_str())
}

/// Label of a `ক.` sub-question line.
pub fn question_label(line: &str, labels: &[char]) -> Option<char> {
    let caps = QUESTION_LABEL.captures(line)?;
    caps[1].chars().next().filter(|label| labels.contains(label))
}

/// Label of an `উত্তর (ক)` / `উত্তর: ক.` solution line. A label that runs
/// into a vowel sign is the start of a word (`উত্তর খুঁজে`), not a label.
pub fn answer_label(line: &str, labels: &[char]) -> Option<char> {
    let caps = ANSWER_LABEL.captures(line)?;
    let found = caps.get(1)?;
    if line[found.end()..].chars().next().is_some_and(is_bangla_sign) {
        return None;
    }
    found.as_str().chars().next().filter(|label| labels.contains(label))
}

/// Trailing `[...]` tag of a line.
pub fn trailing_reference(line: &str) -> Option<String> {
    TRAILING_REFERENCE
        .captures(line)
        .map(|caps| caps[1].to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Questions,
    Solutions,
}

/// Extract every creative question from `paragraphs`.
#[instrument(skip(paragraphs), fields(paragraph_count = paragraphs.len()))]
pub fn extract_cqs(paragraphs: &[Paragraph], math_subject: bool) -> Vec<CqRecord> {
    let labels = labels_for(math_subject);
    let mut records: Vec<CqRecord> = Vec::new();
    let mut section = Section::Questions;
    let mut last_question: Option<char> = None;
    let mut last_solution: Option<char> = None;

    for (index, paragraph) in paragraphs.iter().enumerate() {
        if paragraph.is_blank() {
            continue;
        }
        let text = paragraph.text();
        let line = text.trim();

        if let Some(serial) = stem_serial(line) {
            records.push(CqRecord {
                serial: serial.to_string(),
                stem: vec![index],
                reference: trailing_reference(line),
                ..CqRecord::default()
            });
            section = Section::Questions;
            last_question = None;
            last_solution = None;
            continue;
        }

        let Some(record) = records.last_mut() else {
            debug!(paragraph = index, "skipping text before the first question");
            continue;
        };

        if let Some(label) = answer_label(line, labels) {
            if let Some(replaced) = record.solutions.insert(label, vec![index]) {
                warn!(
                    serial = %record.serial,
                    %label,
                    dropped = ?replaced,
                    "repeated solution label replaces the earlier one"
                );
            }
            last_solution = Some(label);
            section = Section::Solutions;
            continue;
        }

        match section {
            Section::Questions => {
                if let Some(label) = question_label(line, labels) {
                    if let Some(replaced) = record.questions.insert(label, vec![index]) {
                        warn!(
                            serial = %record.serial,
                            %label,
                            dropped = ?replaced,
                            "repeated sub-question label replaces the earlier one"
                        );
                    }
                    last_question = Some(label);
                } else if let Some(paragraphs) =
                    last_question.and_then(|label| record.questions.get_mut(&label))
                {
                    paragraphs.push(index);
                } else {
                    record.stem.push(index);
                    if record.reference.is_none() {
                        record.reference = trailing_reference(line);
                    }
                }
            }
            Section::Solutions => {
                if let Some(paragraphs) =
                    last_solution.and_then(|label| record.solutions.get_mut(&label))
                {
                    paragraphs.push(index);
                }
            }
        }
    }

    debug!(records = records.len(), "CQ extraction complete");
    records
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mcq::extract::tests::paragraphs;

    pub(crate) const FIXTURE: &[&str] = &[
        "সৃজনশীল প্রশ্ন",
        "প্রশ্ন ১. একটি ত্রিভুজের তিন বাহু ৩, ৪ ও ৫ সেমি। [ঢা. বো. ২৩]",
        "চিত্রটি লক্ষ কর।",
        "ক. ত্রিভুজটির পরিসীমা কত?",
        "খ. দেখাও যে ত্রিভুজটি সমকোণী।",
        "গ. ত্রিভুজটির ক্ষেত্রফল নির্ণয় কর।",
        "ঘ. পরিবৃত্তের ব্যাসার্ধ নির্ণয় কর।",
        "উত্তর (ক) পরিসীমা = ৩ + ৪ + ৫ = ১২ সেমি।",
        "উত্তর (খ) ৩² + ৪² = ৫²",
        "সুতরাং ত্রিভুজটি সমকোণী।",
        "উত্তর (গ) ক্ষেত্রফল = ৬ বর্গ সেমি।",
        "",
        "প্রশ্ন ২. রহিম একটি দোকান থেকে কলম কেনে।",
        "ক. লাভ কাকে বলে?",
        "লাভের সূত্র লেখ।",
        "খ. শতকরা লাভ নির্ণয় কর।",
        "উত্তর: ক. বিক্রয়মূল্য ক্রয়মূল্যের চেয়ে বেশি হলে লাভ হয়।",
        "উত্তর খ) লাভ ২০%",
    ];

    #[test]
    fn fixture_yields_two_records() {
        let records = extract_cqs(&paragraphs(FIXTURE), false);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|record| !record.serial.is_empty()));
        assert_eq!(records[0].serial, "১");
        assert_eq!(records[1].serial, "২");
    }

    #[test]
    fn stem_questions_and_solutions() {
        let records = extract_cqs(&paragraphs(FIXTURE), false);
        let first = &records[0];
        assert_eq!(first.stem, vec![1, 2]);
        assert_eq!(first.reference.as_deref(), Some("[ঢা. বো. ২৩]"));
        assert_eq!(first.questions.keys().copied().collect::<Vec<_>>(), vec!['ক', 'খ', 'গ', 'ঘ']);
        assert_eq!(first.solutions[&'খ'], vec![8, 9]);
        assert_eq!(first.solutions.len(), 3);
        assert_eq!(first.labels(), vec!['ক', 'খ', 'গ', 'ঘ']);
    }

    #[test]
    fn unlabelled_line_extends_last_question() {
        let records = extract_cqs(&paragraphs(FIXTURE), false);
        let second = &records[1];
        assert_eq!(second.reference, None);
        assert_eq!(second.questions[&'ক'], vec![13, 14]);
        assert_eq!(second.solutions[&'ক'], vec![16]);
        assert_eq!(second.solutions[&'খ'], vec![17]);
    }

    #[test]
    fn repeated_label_keeps_the_later_paragraphs() {
        let lines = [
            "প্রশ্ন ৩. উদ্দীপক",
            "ক. প্রথম প্রশ্ন",
            "ক. আবার প্রথম প্রশ্ন",
            "উত্তর (ক) প্রথম সমাধান",
            "উত্তর (ক) দ্বিতীয় সমাধান",
            "আরও কিছু",
        ];
        let records = extract_cqs(&paragraphs(&lines), false);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].questions[&'ক'], vec![2]);
        assert_eq!(records[0].solutions[&'ক'], vec![4, 5]);
    }

    #[test]
    fn math_subject_stops_at_three_labels() {
        let records = extract_cqs(&paragraphs(FIXTURE), true);
        let first = &records[0];
        assert_eq!(first.questions.len(), 3);
        // The `ঘ.` line is now a continuation of `গ`.
        assert_eq!(first.questions[&'গ'], vec![5, 6]);
    }

    #[test]
    fn answer_labels() {
        let labels = &GENERAL_LABELS;
        assert_eq!(answer_label("উত্তর (ক)", labels), Some('ক'));
        assert_eq!(answer_label("উত্তর: খ. লাভ", labels), Some('খ'));
        assert_eq!(answer_label("উত্তরঃ গ) ৬", labels), Some('গ'));
        assert_eq!(answer_label("উত্তর খুঁজে পাওয়া যায়", labels), None);
        assert_eq!(answer_label("উত্তর: ১২", labels), None);
        assert_eq!(answer_label("উত্তর (ঘ)", &MATH_LABELS), None);
    }

    #[test]
    fn text_before_first_header_is_ignored() {
        let records = extract_cqs(&paragraphs(&["ভূমিকা", "ক. কিছু"]), false);
        assert!(records.is_empty());
    }

    #[test]
    fn stem_reference_from_a_later_stem_paragraph() {
        let records = extract_cqs(
            &paragraphs(&["প্রশ্ন ৩. উদ্দীপক", "দ্বিতীয় লাইন [রা. বো. ২২]", "ক. প্রশ্ন"]),
            false,
        );
        assert_eq!(records[0].reference.as_deref(), Some("[রা. বো. ২২]"));
    }
}
