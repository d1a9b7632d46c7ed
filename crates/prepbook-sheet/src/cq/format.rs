// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CQ formatting — justified stems, bold sub-questions and a solution section
// per question.

use once_cell::sync::Lazy;
use prepbook_core::FormatConfig;
use prepbook_core::error::{PrepbookError, Result};
use prepbook_document::docx::paragraph::{strip_prefix, strip_suffix};
use prepbook_document::{Block, DocxWriter, Paragraph, Part, RunStyle};
use regex::Regex;
use tracing::{debug, instrument};

use super::extract::CqRecord;

pub(crate) static STEM_HEADER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*প্রশ্ন\s+[০-৯0-9]+\.\s*").unwrap());

pub(crate) static SOLUTION_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*উত্তর\s*[:：ঃ]?\s*[(\[]?\s*[কখগঘ]\s*[.)\]]?\s*[.:ঃ]?\s*").unwrap()
});

/// Build the formatted worksheet for the extracted records.
#[instrument(skip_all, fields(records = records.len()))]
pub fn format_cqs(paragraphs: &[Paragraph], records: &[CqRecord], config: &FormatConfig) -> Result<DocxWriter> {
    if records.is_empty() {
        return Err(PrepbookError::NoRecords("CQ".into()));
    }

    let mut writer = DocxWriter::new(config);
    writer.set_justify_by_default(true);

    for record in records {
        let mut blocks = stem(paragraphs, record);

        for indices in record.questions.values() {
            for &index in indices {
                let mut block = Block::new().justified();
                block.push_parts(&paragraphs[index].parts, RunStyle::BOLD);
                blocks.push(block);
            }
        }

        if !record.solutions.is_empty() {
            let mut header = Block::new()
                .justified()
                .with_space_before(config.block_spacing_pt);
            header.push_text(
                format!("{} নং প্রশ্নের সমাধান", record.serial),
                RunStyle::BOLD.underlined().colored(config.accent_color),
            );
            blocks.push(header);
        }

        for (label, indices) in &record.solutions {
            let Some((&first, rest)) = indices.split_first() else {
                continue;
            };
            let mut block = Block::new().justified();
            block.push_text(format!("{label}. "), RunStyle::BOLD);
            block.push_parts(&strip_prefix(&paragraphs[first].parts, &SOLUTION_PREFIX), RunStyle::PLAIN);
            blocks.push(block);

            for &index in rest {
                let mut block = Block::new().justified();
                block.push_parts(&paragraphs[index].parts, RunStyle::PLAIN);
                blocks.push(block);
            }
        }

        if let Some(last) = blocks.last_mut() {
            last.space_after_pt = config.block_spacing_pt;
        }
        for block in blocks {
            writer.push(block);
        }
    }

    debug!(blocks = writer.blocks().len(), "CQ worksheet laid out");
    Ok(writer)
}

fn stem(paragraphs: &[Paragraph], record: &CqRecord) -> Vec<Block> {
    let mut blocks = Vec::new();
    let Some((&first, rest)) = record.stem.split_first() else {
        return blocks;
    };

    let source = &paragraphs[first];
    let text = source.text();
    let header = STEM_HEADER_PREFIX
        .find(&text)
        .map(|found| found.as_str().trim().to_string())
        .unwrap_or_else(|| format!("প্রশ্ন {}.", record.serial));

    let mut block = Block::new().justified();
    block.push_text(format!("{header} "), RunStyle::BOLD);
    let body = strip_prefix(&source.parts, &STEM_HEADER_PREFIX);
    block.push_parts(&without_reference(&body, record.reference.as_deref()), RunStyle::PLAIN);
    if let Some(reference) = &record.reference {
        block.push_text(format!(" {reference}"), RunStyle::BOLD);
    }
    blocks.push(block);

    for &index in rest {
        let mut block = Block::new().justified();
        let parts = without_reference(&paragraphs[index].parts, record.reference.as_deref());
        block.push_parts(&parts, RunStyle::PLAIN);
        blocks.push(block);
    }
    blocks
}

fn without_reference(parts: &[Part], reference: Option<&str>) -> Vec<Part> {
    let mut parts = match reference {
        Some(reference) => strip_suffix(parts, reference),
        None => parts.to_vec(),
    };
    if let Some(Part::Text(last)) = parts.last_mut() {
        let trimmed = last.trim_end().len();
        last.truncate(trimmed);
    }
    parts.retain(|part| !matches!(part, Part::Text(text) if text.is_empty()));
    parts
}
