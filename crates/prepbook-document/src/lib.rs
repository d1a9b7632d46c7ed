// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// prepbook-document — Document processing for the Prepbook worksheet formatter.
//
// Provides DOCX reading and writing with OMML equations kept intact, equation
// flattening to LaTeX or Unicode text, and lighter-grayscale PDF conversion.

pub mod docx;
pub mod image;
pub mod omml;
pub mod pdf;

// Re-export the primary structs so callers can use `prepbook_document::DocxReader` etc.
pub use docx::{Block, DocxReader, DocxWriter, Paragraph, Part, RunStyle};
pub use image::ImageProcessor;
pub use omml::MathNode;
pub use pdf::PdfGrayscale;
