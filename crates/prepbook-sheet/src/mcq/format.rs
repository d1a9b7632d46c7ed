// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MCQ formatting — lay extracted records out as worksheet paragraphs.

use once_cell::sync::Lazy;
use prepbook_core::{FormatConfig, OptionLayout};
use prepbook_document::docx::paragraph::{strip_prefix, strip_suffix};
use prepbook_document::{Block, DocxWriter, Paragraph, Part, RunStyle};
use regex::Regex;
use tracing::{debug, instrument};

use super::extract::{McqRecord, ROMAN_ITEM};
use super::layout::{classify, effective_length};
use crate::text::{BANGLA_LABELS, REFERENCE_TAG, ROMAN_NUMERALS, comparison_key};

pub(crate) static SERIAL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\(?\s*[০-৯0-9]+\s*[.)।]?\s*").unwrap());

pub(crate) static OPTION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*[(\[]?\s*[কখগঘa-d]\s*[.)\]।:ঃ]?\s*").unwrap());

static ANSWER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*উত্তর\s*[:：ঃ]?\s*").unwrap());

pub(crate) static EXPLANATION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*ব্যাখ্যা\s*[:：ঃ]?\s*").unwrap());

/// Lines outside question blocks that start with one of these are headings.
const HEADING_KEYWORDS: [&str; 5] = [
    "উদ্দীপক",
    "নিচের",
    "তথ্যের ভিত্তিতে",
    "তথ্যের আলোকে",
    "প্রশ্নের উত্তর দাও",
];

/// The closing prompt of a multi-paragraph question ("which is correct?").
const PROMPT_KEYWORDS: [&str; 5] = ["সঠিক", "ঠিক", "যথাযথ", " কোনটি", "কোনগুলো"];

/// Build the formatted worksheet for `paragraphs`, replacing each record's
/// span with its formatted blocks and passing everything else through.
#[instrument(skip_all, fields(paragraphs = paragraphs.len(), records = records.len()))]
pub fn format_mcqs(paragraphs: &[Paragraph], records: &[McqRecord], config: &FormatConfig) -> DocxWriter {
    let mut writer = DocxWriter::new(config);
    let formatter = McqFormatter { paragraphs, config };
    let mut records = records.iter().peekable();
    let mut index = 0;

    while index < paragraphs.len() {
        // Records are ordered by span; skip any that start before the cursor.
        while records.next_if(|record| record.span.start < index).is_some() {}

        if let Some(record) = records.next_if(|record| record.span.start == index) {
            for block in formatter.record(record) {
                writer.push(block);
            }
            index = record.span.end.max(index + 1);
            continue;
        }

        let paragraph = &paragraphs[index];
        if !paragraph.is_blank() {
            writer.push(passthrough(paragraph));
        }
        index += 1;
    }

    debug!(blocks = writer.blocks().len(), "MCQ worksheet laid out");
    writer
}

/// A paragraph outside any record, bold when it reads as a heading.
fn passthrough(paragraph: &Paragraph) -> Block {
    let text = paragraph.content();
    let heading = HEADING_KEYWORDS.iter().any(|keyword| text.starts_with(keyword));
    let mut block = Block::new();
    block.push_parts(&paragraph.parts, RunStyle::PLAIN.bold(heading));
    block
}

struct McqFormatter<'a> {
    paragraphs: &'a [Paragraph],
    config: &'a FormatConfig,
}

impl McqFormatter<'_> {
    fn record(&self, record: &McqRecord) -> Vec<Block> {
        let mut blocks = self.question(record);

        let options: Vec<Vec<Part>> = record
            .ordered_options()
            .into_iter()
            .map(|option| option_parts(&self.paragraphs[option.paragraph]))
            .collect();
        blocks.extend(self.options(&options));

        if let Some(answer) = self.answer(record, &options) {
            blocks.push(answer);
        }

        if let Some(index) = record.explanation {
            let mut block = Block::new();
            block.push_text("ব্যাখ্যা: ", RunStyle::BOLD);
            block.push_parts(
                &strip_prefix(&self.paragraphs[index].parts, &EXPLANATION_PREFIX),
                RunStyle::PLAIN,
            );
            blocks.push(block);
        }

        if let Some(last) = blocks.last_mut() {
            last.space_after_pt = self.config.block_spacing_pt;
        }
        blocks
    }

    fn question(&self, record: &McqRecord) -> Vec<Block> {
        let mut blocks = Vec::new();
        let Some((&first, rest)) = record.question.split_first() else {
            return blocks;
        };

        let mut line = Block::new();
        line.push_text(format!("{}. ", record.serial), RunStyle::BOLD);
        let parts = strip_prefix(&self.paragraphs[first].parts, &SERIAL_PREFIX);
        line.push_parts(&without_tags(&parts), RunStyle::PLAIN);
        if !record.references.is_empty() {
            line.push_text(format!("  {}", record.references.join(" ")), RunStyle::PLAIN);
        }
        blocks.push(line);

        let mut prompts = Vec::new();
        let mut numeral = 0;
        for &index in rest {
            let paragraph = &self.paragraphs[index];
            let text = paragraph.content();
            if is_reference_line(&text) {
                continue;
            }

            let mut block = Block::new();
            if ROMAN_ITEM.is_match(&text) {
                let label = ROMAN_NUMERALS[numeral.min(ROMAN_NUMERALS.len() - 1)];
                numeral += 1;
                block.push_text(format!("{label} "), RunStyle::BOLD);
                let item = strip_prefix(&paragraph.parts, &ROMAN_ITEM);
                block.push_parts(&without_tags(&item), RunStyle::PLAIN);
                blocks.push(block);
            } else if PROMPT_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
                block.push_parts(&without_tags(&paragraph.parts), RunStyle::PLAIN);
                prompts.push(block);
            } else {
                block.push_parts(&without_tags(&paragraph.parts), RunStyle::PLAIN);
                blocks.push(block);
            }
        }
        blocks.extend(prompts);
        blocks
    }

    fn options(&self, options: &[Vec<Part>]) -> Vec<Block> {
        let thresholds = &self.config.layout;
        let lengths: Vec<usize> = options
            .iter()
            .map(|parts| effective_length(parts, thresholds))
            .collect();

        match classify(&lengths, thresholds) {
            OptionLayout::OneLine => {
                vec![option_row(options, 0, &self.config.tab_stops_one_line_in)]
            }
            OptionLayout::TwoLine => options
                .chunks(2)
                .enumerate()
                .map(|(row, pair)| option_row(pair, row * 2, &self.config.tab_stops_two_line_in))
                .collect(),
            OptionLayout::FourLine => options
                .iter()
                .enumerate()
                .map(|(position, parts)| option_row(std::slice::from_ref(parts), position, &[]))
                .collect(),
        }
    }

    fn answer(&self, record: &McqRecord, options: &[Vec<Part>]) -> Option<Block> {
        let answer = record.answer.as_ref()?;
        let mut block = Block::new();
        block.push_text("উত্তর: ", RunStyle::BOLD.colored(self.config.accent_color));

        match answer_position(self.paragraphs, record, options) {
            Some(position) if position < options.len() => {
                block.push_text(format!("{}. ", BANGLA_LABELS[position]), RunStyle::PLAIN);
                block.push_parts(&options[position], RunStyle::PLAIN);
            }
            Some(position) => {
                block.push_text(format!("{}. ", BANGLA_LABELS[position]), RunStyle::PLAIN);
                block.push_text(answer.text.as_str(), RunStyle::PLAIN);
            }
            None if answer.label.is_some() => block.push_text(answer.text.as_str(), RunStyle::PLAIN),
            None => block.push_parts(&answer_parts(&self.paragraphs[answer.paragraph]), RunStyle::PLAIN),
        }
        Some(block)
    }
}

/// Output position of the record's answer: through its label, or else the
/// option whose content equals the answer text ignoring space and case.
pub(crate) fn answer_position(paragraphs: &[Paragraph], record: &McqRecord, options: &[Vec<Part>]) -> Option<usize> {
    let answer = record.answer.as_ref()?;
    if answer.label.is_some() {
        return record
            .answer_position()
            .filter(|position| *position < BANGLA_LABELS.len());
    }

    let key = comparison_key(&Paragraph::new(answer_parts(&paragraphs[answer.paragraph])).content());
    if key.is_empty() {
        return None;
    }
    options
        .iter()
        .position(|option| comparison_key(&Paragraph::new(option.clone()).content()) == key)
}

/// Answer line content with `উত্তর:` removed.
fn answer_parts(paragraph: &Paragraph) -> Vec<Part> {
    strip_prefix(&paragraph.parts, &ANSWER_PREFIX)
}

/// One paragraph of options starting at output position `first`.
fn option_row(options: &[Vec<Part>], first: usize, tab_stops: &[f32]) -> Block {
    let mut block = Block::new().with_tab_stops(tab_stops);
    for (offset, parts) in options.iter().enumerate() {
        if offset > 0 {
            block.push_tab();
        }
        let label = BANGLA_LABELS[(first + offset).min(BANGLA_LABELS.len() - 1)];
        block.push_text(format!("{label}. "), RunStyle::BOLD);
        block.push_parts(parts, RunStyle::PLAIN);
    }
    block
}

/// Option content with its source label removed.
pub(crate) fn option_parts(paragraph: &Paragraph) -> Vec<Part> {
    strip_prefix(&paragraph.parts, &OPTION_PREFIX)
}

/// A line that holds nothing but one `[...]` tag.
fn is_reference_line(text: &str) -> bool {
    let text = text.trim();
    text.starts_with('[') && text.ends_with(']') && text.matches('[').count() == 1
}

/// Parts with every `[...]` tag removed and trailing space trimmed.
pub(crate) fn without_tags(parts: &[Part]) -> Vec<Part> {
    let text: String = parts.iter().filter_map(Part::as_text).collect();
    let mut stripped = parts.to_vec();
    for tag in REFERENCE_TAG.find_iter(&text).collect::<Vec<_>>().iter().rev() {
        stripped = strip_suffix(&stripped, tag.as_str());
    }

    let mut out: Vec<Part> = stripped
        .into_iter()
        .map(|part| match part {
            Part::Text(text) => Part::Text(REFERENCE_TAG.replace_all(&text, "").into_owned()),
            math => math,
        })
        .collect();
    if let Some(Part::Text(last)) = out.last_mut() {
        let trimmed = last.trim_end().len();
        last.truncate(trimmed);
    }
    out.retain(|part| !matches!(part, Part::Text(text) if text.is_empty()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcq::extract::extract_mcqs;
    use crate::mcq::extract::tests::{FIXTURE, paragraphs};
    use prepbook_document::docx::Inline;

    fn block_text(block: &Block) -> String {
        block
            .inlines
            .iter()
            .map(|inline| match inline {
                Inline::Text { text, .. } => text.clone(),
                Inline::Tab => "\t".to_string(),
                Inline::Math(math) => math.plain_text(),
            })
            .collect()
    }

    fn formatted(lines: &[&str]) -> Vec<Block> {
        let paragraphs = paragraphs(lines);
        let records = extract_mcqs(&paragraphs);
        format_mcqs(&paragraphs, &records, &FormatConfig::default())
            .blocks()
            .to_vec()
    }

    #[test]
    fn fixture_layout() {
        let blocks = formatted(FIXTURE);
        let texts: Vec<String> = blocks.iter().map(block_text).collect();
        assert_eq!(
            texts,
            vec![
                "নিচের প্রশ্নগুলোর উত্তর দাও",
                "১. ৫ এর গুণিতক কোনটি?  [ঢা. বো. ২৩]",
                "ক. ১২\tখ. ১৫\tগ. ১৮\tঘ. ২২",
                "উত্তর: খ. ১৫",
                "ব্যাখ্যা: ১৫ = ৫ × ৩",
                "২. নিচের তথ্যগুলো লক্ষ কর:",
                "i. ২ মৌলিক সংখ্যা",
                "ii. ৯ যৌগিক সংখ্যা",
                "iii. ১ মৌলিক সংখ্যা",
                "নিচের কোনটি সঠিক?",
                "ক. i ও ii\tখ. i ও iii",
                "গ. ii ও iii\tঘ. i, ii ও iii",
                "উত্তর: ক. i ও ii",
                "৩. উদ্দীপকের আলোকে ত্রিভুজটির ক্ষেত্রফল কত?",
                "ক. 12 cm\tখ. 24 cm",
                "গ. 36 cm\tঘ. 48 cm",
                "উত্তর: খ. 24 cm",
                "শেষ কথা",
            ]
        );
    }

    #[test]
    fn headings_are_bold_and_plain_lines_are_not() {
        let blocks = formatted(FIXTURE);
        let first_style = |block: &Block| match &block.inlines[0] {
            Inline::Text { style, .. } => *style,
            other => panic!("unexpected inline {other:?}"),
        };
        assert!(first_style(&blocks[0]).bold);
        assert!(!first_style(blocks.last().unwrap()).bold);
    }

    #[test]
    fn answer_label_is_coloured_and_block_end_is_spaced() {
        let config = FormatConfig::default();
        let blocks = formatted(FIXTURE);
        match &blocks[3].inlines[0] {
            Inline::Text { text, style } => {
                assert_eq!(text, "উত্তর: ");
                assert!(style.bold);
                assert_eq!(style.color, Some(config.accent_color));
            }
            other => panic!("unexpected inline {other:?}"),
        }
        assert_eq!(blocks[4].space_after_pt, config.block_spacing_pt);
        assert_eq!(blocks[3].space_after_pt, 0.0);
        assert_eq!(blocks[12].space_after_pt, config.block_spacing_pt);
    }

    #[test]
    fn one_line_options_use_configured_tab_stops() {
        let config = FormatConfig::default();
        let blocks = formatted(FIXTURE);
        assert_eq!(blocks[2].tab_stops_in, config.tab_stops_one_line_in);
        assert_eq!(blocks[10].tab_stops_in, config.tab_stops_two_line_in);
    }

    #[test]
    fn long_options_get_a_line_each() {
        let blocks = formatted(&[
            "১. কোনটি সত্য?",
            "ক. সূর্য পূর্ব দিকে উদিত হয় এবং পশ্চিমে অস্ত যায়",
            "খ. চাঁদের নিজস্ব আলো আছে",
            "গ. পৃথিবী স্থির",
            "ঘ. কোনোটিই নয়",
            "উত্তর: ক",
        ]);
        assert_eq!(blocks.len(), 6);
        assert_eq!(block_text(&blocks[2]), "খ. চাঁদের নিজস্ব আলো আছে");
        assert!(blocks[1].tab_stops_in.is_empty());
    }

    #[test]
    fn unmatched_unlabelled_answer_is_written_as_is() {
        let blocks = formatted(&["১. প্রশ্ন", "ক. ১", "খ. ২", "উত্তর: কোনোটিই নয়"]);
        assert_eq!(block_text(blocks.last().unwrap()), "উত্তর: কোনোটিই নয়");
    }

    #[test]
    fn labelled_answer_beyond_options_keeps_its_text() {
        let blocks = formatted(&["১. প্রশ্ন", "ক. ১", "খ. ২", "উত্তর: (ঘ) ৪"]);
        assert_eq!(block_text(blocks.last().unwrap()), "উত্তর: ঘ. ৪");
    }

    #[test]
    fn reference_lines_are_dropped_and_mid_line_tags_removed() {
        let blocks = formatted(&[
            "৪. উদ্দীপকটি পড় [কু. বো. ২২]",
            "[য. বো. ২১]",
            "ক. ১",
            "উত্তর: ক",
        ]);
        assert_eq!(block_text(&blocks[0]), "৪. উদ্দীপকটি পড়  [কু. বো. ২২] [য. বো. ২১]");
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn tags_are_removed_across_runs() {
        let parts = vec![
            Part::Text("প্রশ্ন [ঢা.".into()),
            Part::Text(" বো.]  ".into()),
        ];
        assert_eq!(without_tags(&parts), vec![Part::Text("প্রশ্ন".into())]);
    }

    #[test]
    fn blank_paragraphs_are_dropped() {
        let blocks = formatted(&["", "  ", "শিরোনাম"]);
        assert_eq!(blocks.len(), 1);
    }
}
