// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delimited-text (CSV) export, UTF-8 with a byte order mark.

use std::io::Write;
use std::path::Path;

use prepbook_core::error::{PrepbookError, Result};

use super::table::Table;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn csv_err(err: csv::Error) -> PrepbookError {
    PrepbookError::Export(format!("CSV: {err}"))
}

/// Serialise `table` to CSV bytes.
pub fn to_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(&table.columns).map_err(csv_err)?;
        for row in &table.rows {
            writer.write_record(row).map_err(csv_err)?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

pub fn write(table: &Table, path: &Path) -> Result<()> {
    let bytes = to_bytes(table)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_bom_and_quotes_commas() {
        let mut table = Table::new(["Serial", "Question"]);
        table.push_row(vec!["১".into(), "৩, ৪ ও ৫".into()]);
        let bytes = to_bytes(&table).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "Serial,Question\n১,\"৩, ৪ ও ৫\"\n");
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        write(&Table::new(["A"]), &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"\xEF\xBB\xBFA\n");
    }
}
