// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MCQ extraction — a single pass over the source paragraphs that recovers
// serial, question, options, answer and explanation of every question block.

use std::ops::Range;

use once_cell::sync::Lazy;
use prepbook_core::QuestionKind;
use prepbook_document::Paragraph;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::text::{BANGLA_LABELS, is_bangla_sign, label_position, reference_tags};

static SERIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\(?([০-৯0-9]+)[.)।]?").unwrap());

static ANSWER_WITH_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^উত্তর[:：ঃ]?\s*[(\[]?\s*([কখগঘa-d])([.)\]।]?)\s*(.*)").unwrap()
});

static ANSWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)^উত্তর[:：ঃ]?\s*(.*)").unwrap());

static EXPLANATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ব্যাখ্যা[:：ঃ]?").unwrap());

/// Roman-numeral statement prefix such as `ii.` or `(iv)`.
pub static ROMAN_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*\(?(?:x|ix|viii|vii|vi|v|iv|iii|ii|i)[.)]\s*").unwrap()
});

/// An option of a record: its source label and paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqOption {
    pub label: String,
    pub paragraph: usize,
}

/// The answer line of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqAnswer {
    /// Label named by the answer line, if any.
    pub label: Option<String>,
    pub paragraph: usize,
    /// Text after the label (or after `উত্তর` when there is no label).
    pub text: String,
}

/// One recognised question block.
#[derive(Debug, Clone, PartialEq)]
pub struct McqRecord {
    pub serial: String,
    /// Question paragraphs; the first one carries the serial.
    pub question: Vec<usize>,
    /// `[...]` tags found in the question paragraphs.
    pub references: Vec<String>,
    pub kind: QuestionKind,
    /// Options in first-seen order. A repeated label replaces the earlier paragraph.
    pub options: Vec<McqOption>,
    pub answer: Option<McqAnswer>,
    pub explanation: Option<usize>,
    /// Every paragraph consumed by the block.
    pub span: Range<usize>,
}

impl McqRecord {
    fn open(serial: &str, index: usize) -> Self {
        Self {
            serial: serial.to_string(),
            question: Vec::new(),
            references: Vec::new(),
            kind: QuestionKind::General,
            options: Vec::new(),
            answer: None,
            explanation: None,
            span: index..index + 1,
        }
    }

    /// Options ordered Bangla labels first, then Latin labels, at most four.
    /// The position in this list is the option's output label.
    pub fn ordered_options(&self) -> Vec<&McqOption> {
        let mut bangla: Vec<&McqOption> = self
            .options
            .iter()
            .filter(|option| BANGLA_LABELS.contains(&option.label.as_str()))
            .collect();
        bangla.sort_by_key(|option| label_position(&option.label));

        let mut latin: Vec<&McqOption> = self
            .options
            .iter()
            .filter(|option| !BANGLA_LABELS.contains(&option.label.as_str()))
            .collect();
        latin.sort_by_key(|option| latin_rank(&option.label));

        bangla.into_iter().chain(latin).take(4).collect()
    }

    /// Output position of the option the answer label points at: an option
    /// with exactly that label, else the label's own position.
    pub fn answer_position(&self) -> Option<usize> {
        let label = self.answer.as_ref()?.label.as_deref()?;
        let ordered = self.ordered_options();
        ordered
            .iter()
            .position(|option| option.label == label)
            .or_else(|| label_position(label))
    }

    fn set_option(&mut self, label: &str, paragraph: usize) {
        match self.options.iter_mut().find(|option| option.label == label) {
            Some(option) => option.paragraph = paragraph,
            None => self.options.push(McqOption {
                label: label.to_string(),
                paragraph,
            }),
        }
    }

    fn consume(&mut self, index: usize) {
        self.span.end = self.span.end.max(index + 1);
    }

    fn classify(&mut self, paragraphs: &[Paragraph]) {
        let multiple_completion = self
            .question
            .iter()
            .any(|&index| ROMAN_ITEM.is_match(paragraphs[index].text().trim()));
        let stem_based = self.question.len() > 1
            || self
                .question
                .first()
                .is_some_and(|&index| paragraphs[index].content().contains("উদ্দীপক"));
        self.kind = if multiple_completion {
            QuestionKind::MultipleCompletion
        } else if stem_based {
            QuestionKind::StemBased
        } else {
            QuestionKind::General
        };
    }
}

fn latin_rank(label: &str) -> usize {
    crate::text::LATIN_LABELS
        .iter()
        .position(|l| *l == label)
        .unwrap_or(usize::MAX)
}

/// Label of an option line: `ক.`, `(খ)`, `গ)`, `[d]`, `ঘ :` or a Bangla label
/// followed by whitespace. A Bangla label directly followed by a vowel sign
/// starts a word and is not an option.
pub fn option_label(line: &str) -> Option<&str> {
    let rest = line.trim_start();
    let (bracketed, rest) = match rest.chars().next() {
        Some(open @ ('(' | '[')) => (true, rest[open.len_utf8()..].trim_start()),
        _ => (false, rest),
    };

    let label = rest.chars().next().filter(|ch| is_option_char(*ch))?;
    let (label, after) = rest.split_at(label.len_utf8());
    let next = after.chars().next();
    if next.is_some_and(is_bangla_sign) {
        return None;
    }

    let is_delimiter = |ch: char| matches!(ch, '.' | ')' | ']' | '।' | ':' | 'ঃ');
    let accepted = if bracketed {
        after.trim_start().chars().next().is_some_and(is_delimiter)
    } else {
        next.is_some_and(is_delimiter)
            || (BANGLA_LABELS.contains(&label) && next.is_some_and(char::is_whitespace))
    };
    accepted.then_some(label)
}

fn is_option_char(ch: char) -> bool {
    matches!(ch, 'ক' | 'খ' | 'গ' | 'ঘ' | 'a'..='d' | 'A'..='D')
}

/// Parse an answer line into its optional label and trailing text.
pub fn parse_answer(line: &str) -> Option<(Option<String>, String)> {
    if let Some(caps) = ANSWER_WITH_LABEL.captures(line) {
        let label = &caps[1];
        let delimited = !caps[2].is_empty();
        let next = line[caps.get(2).map_or(0, |m| m.end())..].chars().next();
        let standalone = next.is_none_or(|ch| ch.is_whitespace() || ch == '(' || ch == '[');
        if delimited || (standalone && !next.is_some_and(is_bangla_sign)) {
            return Some((Some(label.to_string()), answer_text(&caps[3])));
        }
    }
    ANSWER
        .captures(line)
        .map(|caps| (None, answer_text(&caps[1])))
}

fn answer_text(raw: &str) -> String {
    raw.trim_start_matches([')', '.', '।', ' '])
        .trim()
        .to_string()
}

pub fn is_explanation(line: &str) -> bool {
    EXPLANATION.is_match(line)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FindQuestion,
    InQuestion,
    InOptions,
    /// An answer was read; a directly following explanation still belongs to the block.
    AfterAnswer,
}

/// Extract every question block from `paragraphs`.
#[instrument(skip_all, fields(paragraphs = paragraphs.len()))]
pub fn extract_mcqs(paragraphs: &[Paragraph]) -> Vec<McqRecord> {
    let mut records = Vec::new();
    let mut current: Option<McqRecord> = None;
    let mut state = State::FindQuestion;
    let mut index = 0;

    while index < paragraphs.len() {
        let paragraph = &paragraphs[index];
        let line = paragraph.content();

        if line.is_empty() && state != State::InOptions {
            index += 1;
            continue;
        }

        match state {
            State::FindQuestion => {
                if let Some(caps) = SERIAL.captures(&line) {
                    current = Some(McqRecord::open(&caps[1], index));
                    state = State::InQuestion;
                    // Re-examine the serial line as the first question paragraph.
                    continue;
                }
                index += 1;
            }
            State::InQuestion => {
                let Some(record) = current.as_mut() else {
                    state = State::FindQuestion;
                    continue;
                };
                if !record.question.is_empty() && option_label(&line).is_some() {
                    state = State::InOptions;
                    continue;
                }
                record.references.extend(reference_tags(&paragraph.text()));
                record.question.push(index);
                record.consume(index);
                index += 1;
            }
            State::InOptions => {
                let Some(record) = current.as_mut() else {
                    state = State::FindQuestion;
                    continue;
                };
                record.consume(index);
                if let Some(label) = option_label(&line) {
                    record.set_option(label, index);
                } else if let Some((label, text)) = parse_answer(&line) {
                    record.answer = Some(McqAnswer {
                        label,
                        paragraph: index,
                        text,
                    });
                    state = State::AfterAnswer;
                } else if is_explanation(&line) {
                    record.explanation = Some(index);
                    finish(&mut current, &mut records, paragraphs);
                    state = State::FindQuestion;
                } else if !line.is_empty() {
                    debug!(paragraph = index, "skipping unrecognised line inside options");
                }
                index += 1;
            }
            State::AfterAnswer => {
                if is_explanation(&line) {
                    if let Some(record) = current.as_mut() {
                        record.explanation = Some(index);
                        record.consume(index);
                    }
                    index += 1;
                }
                finish(&mut current, &mut records, paragraphs);
                state = State::FindQuestion;
            }
        }
    }

    if current.is_some() {
        if state == State::InQuestion || state == State::InOptions {
            warn!("document ended inside a question block; keeping it");
        }
        finish(&mut current, &mut records, paragraphs);
    }

    debug!(records = records.len(), "MCQ extraction complete");
    records
}

fn finish(current: &mut Option<McqRecord>, records: &mut Vec<McqRecord>, paragraphs: &[Paragraph]) {
    if let Some(mut record) = current.take() {
        record.classify(paragraphs);
        records.push(record);
    }
}
