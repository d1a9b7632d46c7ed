// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export module — tabular output of extracted records.
//
// Records are flattened into a `Table` once; each format writes that table
// next to the formatted document, sharing its base path.

pub mod delimited;
pub mod json;
pub mod rows;
pub mod table;
pub mod xlsx;

use std::path::{Path, PathBuf};

use prepbook_core::error::Result;
use prepbook_core::{ExportFormat, PrepbookError, SheetKind};
use tracing::info;

pub use rows::{cq_table, mcq_table};
pub use table::Table;

/// Path of the `format` export for a document written to `output`.
pub fn export_path(output: &Path, format: ExportFormat) -> PathBuf {
    output.with_extension(format.extension())
}

/// Reject a document path that one of `formats` would overwrite.
pub fn check_document_path(output: &Path, formats: &[ExportFormat]) -> Result<()> {
    let clash = output
        .extension()
        .and_then(|ext| ExportFormat::from_extension(&ext.to_string_lossy()))
        .filter(|format| formats.contains(format));
    match clash {
        Some(format) => Err(PrepbookError::Export(format!(
            "output {} would be overwritten by the {} export",
            output.display(),
            format.extension()
        ))),
        None => Ok(()),
    }
}

/// Write `table` in one format.
pub fn write_table(table: &Table, kind: SheetKind, format: ExportFormat, path: &Path) -> Result<()> {
    match format {
        ExportFormat::Xlsx => xlsx::write(table, kind.label(), path),
        ExportFormat::Csv => delimited::write(table, path),
        ExportFormat::Json => json::write(table, path),
    }
}

/// Write `table` in every requested format next to `output`. Duplicate
/// formats are written once.
pub fn export_all(
    table: &Table,
    kind: SheetKind,
    formats: &[ExportFormat],
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for &format in formats {
        let path = export_path(output, format);
        if written.contains(&path) {
            continue;
        }
        write_table(table, kind, format, &path)?;
        info!(rows = table.len(), "Exported {} to {}", format.extension(), path.display());
        written.push(path);
    }
    Ok(written)
}
