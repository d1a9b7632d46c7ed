// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON export: a pretty-printed array of row objects.

use std::path::Path;

use prepbook_core::error::Result;

use super::table::Table;

/// Serialise `table` as pretty JSON with non-ASCII text left unescaped.
pub fn to_string(table: &Table) -> Result<String> {
    Ok(serde_json::to_string_pretty(&table.to_json())?)
}

pub fn write(table: &Table, path: &Path) -> Result<()> {
    std::fs::write(path, to_string(table)?)?;
    Ok(())
}
