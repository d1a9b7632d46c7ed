// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command handlers. Each one loads what it needs, runs the pipeline and
// prints a short report on stdout.

use std::path::{Path, PathBuf};

use prepbook_core::error::Result;
use prepbook_core::{FormatConfig, PrepbookError, SheetKind};
use prepbook_document::PdfGrayscale;
use prepbook_sheet::{ConvertOptions, ConvertSummary, convert_cq, convert_mcq, extract_table};
use tracing::info;

use crate::config_dir::{default_config_path, load_config};
use crate::{Cli, Command, Kind, SheetArgs};

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Command::Mcq(sheet) => {
            let summary = convert_mcq(&sheet_options(sheet, false), &config)?;
            report(&summary);
        }
        Command::Cq {
            sheet,
            math_subject,
        } => {
            let summary = convert_cq(&sheet_options(sheet, math_subject), &config)?;
            report(&summary);
        }
        Command::Extract {
            input,
            kind,
            math_subject,
            math,
        } => {
            let kind = match kind {
                Kind::Mcq => SheetKind::Mcq,
                Kind::Cq => SheetKind::Cq,
            };
            let rendering = math.unwrap_or(config.math_rendering);
            let table = extract_table(&input, kind, math_subject, rendering)?;
            println!("{}", serde_json::to_string_pretty(&table.to_json())?);
        }
        Command::Grayscale {
            input,
            output,
            factor,
        } => {
            let output = output.unwrap_or_else(|| grayscale_output_path(&input));
            let summary = PdfGrayscale::convert(&input, &output, factor)?;
            info!(
                pages = summary.pages,
                images = summary.images_converted,
                "grayscale conversion complete"
            );
            println!("{}", output.display());
        }
        Command::Config { save } => show_config(&config, save)?,
    }
    Ok(())
}

fn sheet_options(sheet: SheetArgs, math_subject: bool) -> ConvertOptions {
    let mut options = ConvertOptions::new(sheet.input);
    options.output = sheet.output;
    options.exports = if sheet.no_export {
        Some(Vec::new())
    } else {
        sheet.export
    };
    options.math_subject = math_subject;
    options.math_rendering = sheet.math;
    options
}

fn report(summary: &ConvertSummary) {
    println!(
        "{} records: {} -> {}",
        summary.kind.label(),
        summary.records,
        summary.output.display()
    );
    for path in &summary.exports {
        println!("  {}", path.display());
    }
}

/// `<dir>/<stem>_light_grayscale.pdf` next to the input.
pub fn grayscale_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{stem}_light_grayscale.pdf"))
}

fn show_config(config: &FormatConfig, save: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        let path = default_config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                PrepbookError::Config(format!("cannot create {}: {err}", parent.display()))
            })?;
        }
        config.save(&path)?;
        info!(path = %path.display(), "configuration saved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_output_sits_next_to_input() {
        assert_eq!(
            grayscale_output_path(Path::new("/scans/notes.pdf")),
            PathBuf::from("/scans/notes_light_grayscale.pdf")
        );
    }

    #[test]
    fn no_export_clears_formats() {
        let sheet = SheetArgs {
            input: PathBuf::from("a.docx"),
            output: None,
            export: None,
            no_export: true,
            math: None,
        };
        let options = sheet_options(sheet, true);
        assert_eq!(options.exports, Some(Vec::new()));
        assert!(options.math_subject);
    }

    #[test]
    fn cli_parses_export_list() {
        use clap::Parser;
        use prepbook_core::ExportFormat;

        let cli = Cli::try_parse_from(["prepbook", "mcq", "in.docx", "--export", "json,csv"]).unwrap();
        match cli.command {
            Command::Mcq(sheet) => {
                assert_eq!(sheet.export, Some(vec![ExportFormat::Json, ExportFormat::Csv]));
            }
            _ => panic!("expected mcq command"),
        }
    }

    #[test]
    fn extract_help_describes_table_output() {
        use clap::CommandFactory;

        let command = Cli::command();
        let extract = command.find_subcommand("extract").unwrap();
        let about = extract.get_about().unwrap().to_string();
        assert!(about.contains("export table"));
    }
}
