// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion pipelines — read a worksheet, extract its records, write the
// formatted document and the requested tabular exports.

use std::path::{Path, PathBuf};

use prepbook_core::error::Result;
use prepbook_core::{ExportFormat, FormatConfig, MathRendering, SheetKind};
use prepbook_document::{DocxReader, DocxWriter};
use tracing::{info, instrument, warn};

use crate::cq::{extract_cqs, format_cqs};
use crate::export::{Table, check_document_path, cq_table, export_all, mcq_table};
use crate::mcq::{extract_mcqs, format_mcqs};

/// What to convert and where to put the results.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub input: PathBuf,
    /// Formatted document path; defaults to [`default_output_path`].
    pub output: Option<PathBuf>,
    /// Export formats; `None` uses the configured defaults.
    pub exports: Option<Vec<ExportFormat>>,
    /// Math papers use three CQ sub-questions instead of four.
    pub math_subject: bool,
    /// Equation rendering in exports; `None` uses the configured default.
    pub math_rendering: Option<MathRendering>,
}

impl ConvertOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }

    fn export_formats(&self, config: &FormatConfig) -> Vec<ExportFormat> {
        self.exports
            .clone()
            .unwrap_or_else(|| config.default_exports.clone())
    }

    fn rendering(&self, config: &FormatConfig) -> MathRendering {
        self.math_rendering.unwrap_or(config.math_rendering)
    }
}

/// Outcome of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    pub kind: SheetKind,
    pub records: usize,
    pub output: PathBuf,
    pub exports: Vec<PathBuf>,
}

/// `<dir>/<stem>_Reformatted.docx` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "worksheet".to_string());
    input.with_file_name(format!("{stem}_Reformatted.docx"))
}

fn save_document(mut writer: DocxWriter, options: &ConvertOptions, output: &Path) -> Result<()> {
    if let Some(stem) = options.input.file_stem() {
        writer.set_title(stem.to_string_lossy());
    }
    writer.save(output)
}

/// Reformat an MCQ worksheet. A document without question blocks is still
/// written (as a cleaned pass-through), but nothing is exported.
#[instrument(skip_all, fields(input = %options.input.display()))]
pub fn convert_mcq(options: &ConvertOptions, config: &FormatConfig) -> Result<ConvertSummary> {
    let output = options.output_path();
    let formats = options.export_formats(config);
    check_document_path(&output, &formats)?;

    let paragraphs = DocxReader::open(&options.input)?.into_paragraphs();
    let records = extract_mcqs(&paragraphs);
    if records.is_empty() {
        warn!("no MCQ blocks found; writing the document through unchanged in layout");
    }

    let writer = format_mcqs(&paragraphs, &records, config);
    save_document(writer, options, &output)?;

    let exports = if records.is_empty() || formats.is_empty() {
        Vec::new()
    } else {
        let table = mcq_table(&paragraphs, &records, options.rendering(config));
        export_all(&table, SheetKind::Mcq, &formats, &output)?
    };

    info!(records = records.len(), exports = exports.len(), "MCQ conversion complete");
    Ok(ConvertSummary {
        kind: SheetKind::Mcq,
        records: records.len(),
        output,
        exports,
    })
}

/// Reformat a CQ worksheet. Fails when the document holds no creative questions.
#[instrument(skip_all, fields(input = %options.input.display()))]
pub fn convert_cq(options: &ConvertOptions, config: &FormatConfig) -> Result<ConvertSummary> {
    let output = options.output_path();
    let formats = options.export_formats(config);
    check_document_path(&output, &formats)?;

    let paragraphs = DocxReader::open(&options.input)?.into_paragraphs();
    let records = extract_cqs(&paragraphs, options.math_subject);

    let writer = format_cqs(&paragraphs, &records, config)?;
    save_document(writer, options, &output)?;

    let exports = if formats.is_empty() {
        Vec::new()
    } else {
        let table = cq_table(&paragraphs, &records, options.math_subject, options.rendering(config));
        export_all(&table, SheetKind::Cq, &formats, &output)?
    };

    info!(records = records.len(), exports = exports.len(), "CQ conversion complete");
    Ok(ConvertSummary {
        kind: SheetKind::Cq,
        records: records.len(),
        output,
        exports,
    })
}

/// Extract the records of a worksheet as a table without writing anything.
pub fn extract_table(
    input: &Path,
    kind: SheetKind,
    math_subject: bool,
    rendering: MathRendering,
) -> Result<Table> {
    let paragraphs = DocxReader::open(input)?.into_paragraphs();
    let table = match kind {
        SheetKind::Mcq => mcq_table(&paragraphs, &extract_mcqs(&paragraphs), rendering),
        SheetKind::Cq => cq_table(&paragraphs, &extract_cqs(&paragraphs, math_subject), math_subject, rendering),
    };
    Ok(table)
}
