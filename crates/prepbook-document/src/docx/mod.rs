// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX module — reading body paragraphs and writing formatted documents.

pub mod paragraph;
pub mod reader;
pub mod writer;
pub mod xml;

pub use paragraph::{Paragraph, Part};
pub use reader::DocxReader;
pub use writer::{Alignment, Block, DocxWriter, Inline, RunStyle};
