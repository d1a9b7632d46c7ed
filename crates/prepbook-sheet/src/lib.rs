// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// prepbook-sheet — Worksheet extraction and formatting for Prepbook.
//
// Recovers MCQ and CQ blocks from Bangla worksheets, lays them out in the
// standard two-column format and exports the records as spreadsheet, CSV or
// JSON tables.

pub mod convert;
pub mod cq;
pub mod export;
pub mod mcq;
pub mod text;

pub use convert::{ConvertOptions, ConvertSummary, convert_cq, convert_mcq, default_output_path, extract_table};
pub use cq::{CqRecord, extract_cqs, format_cqs};
pub use export::Table;
pub use mcq::{McqRecord, extract_mcqs, format_mcqs};
