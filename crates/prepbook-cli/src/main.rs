// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Prepbook — Bangla worksheet reformatter
//
// Entry point. Parses the command line, initialises logging, loads the
// configuration and dispatches to the selected command.

mod commands;
mod config_dir;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use prepbook_core::human_errors::humanize_error;
use prepbook_core::{ExportFormat, MathRendering};
use prepbook_document::pdf::DEFAULT_BRIGHTNESS;

#[derive(Parser)]
#[command(name = "prepbook", version)]
#[command(about = "Reformat Bangla MCQ/CQ worksheets and lighten PDFs for printing")]
struct Cli {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/prepbook/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug detail (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reformat an MCQ worksheet
    Mcq(SheetArgs),
    /// Reformat a creative-question (CQ) worksheet
    Cq {
        #[command(flatten)]
        sheet: SheetArgs,
        /// Math paper: sub-questions ক, খ and গ only
        #[arg(long)]
        math_subject: bool,
    },
    /// Print a worksheet's export table (one row per record) as JSON
    Extract {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = Kind::Mcq)]
        kind: Kind,
        #[arg(long)]
        math_subject: bool,
        /// Equation rendering: latex, unicode or plain
        #[arg(long)]
        math: Option<MathRendering>,
    },
    /// Convert a PDF to lighter grayscale
    Grayscale {
        input: PathBuf,
        /// Output PDF (defaults to <input>_light_grayscale.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Brightness multiplier applied to every gray sample
        #[arg(long, default_value_t = DEFAULT_BRIGHTNESS)]
        factor: f32,
    },
    /// Print the effective configuration
    Config {
        /// Also write it to the default configuration file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args)]
struct SheetArgs {
    input: PathBuf,
    /// Output DOCX (defaults to <input>_Reformatted.docx)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Export formats, comma separated: xlsx, csv, json
    #[arg(long, value_delimiter = ',')]
    export: Option<Vec<ExportFormat>>,
    /// Skip tabular exports
    #[arg(long, conflicts_with = "export")]
    no_export: bool,
    /// Equation rendering in exports: latex, unicode or plain
    #[arg(long)]
    math: Option<MathRendering>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Mcq,
    Cq,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}
