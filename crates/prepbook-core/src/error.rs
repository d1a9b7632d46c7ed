// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Prepbook.

use thiserror::Error;

/// Top-level error type for all Prepbook operations.
#[derive(Debug, Error)]
pub enum PrepbookError {
    // -- Source documents --
    #[error("DOCX package error: {0}")]
    Docx(String),

    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("malformed equation markup: {0}")]
    Equation(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Extraction --
    #[error("no {0} blocks found in the document")]
    NoRecords(String),

    // -- Output --
    #[error("export failed: {0}")]
    Export(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrepbookError>;
