mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use sheet_diff::{CompareError, ConfigError, ContainerError, OpenError, SheetParseError};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sheet-diff")]
#[command(about = "Compare versions of tabular workbooks and show differences")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compare two workbooks")]
    Diff {
        #[arg(help = "Path to the old/base workbook")]
        old: String,
        #[arg(help = "Path to the new/changed workbook")]
        new: String,
        #[arg(long, short, help = "Column to align rows on (row position if omitted)")]
        key: Option<String>,
        #[arg(long = "ignore", value_name = "COLUMN", help = "Column to exclude from every sheet's comparison (repeatable)")]
        ignored: Vec<String>,
        #[arg(long = "ref-col", value_name = "COLUMN", help = "Old-table column carried into the changed block as context (repeatable)")]
        reference: Vec<String>,
        #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
        #[arg(long, short, value_name = "PATH", help = "Write a formatted .xlsx comparison to this path")]
        output: Option<String>,
        #[arg(long, value_enum, default_value = "warn", help = "Behavior when sheet counts differ")]
        on_extra_sheets: ExtraSheets,
        #[arg(long, short, help = "Quiet mode: only show summary")]
        quiet: bool,
        #[arg(long, short, help = "Verbose mode: show unchanged sheets too")]
        verbose: bool,
    },
    #[command(about = "Show information about a workbook")]
    Info {
        #[arg(help = "Path to the workbook")]
        path: String,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExtraSheets {
    /// Truncate to the shorter workbook and warn.
    Warn,
    /// Report unpaired sheets as entirely added or deleted.
    Diff,
    /// Abort the comparison.
    Error,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Diff {
            old,
            new,
            key,
            ignored,
            reference,
            format,
            output,
            on_extra_sheets,
            quiet,
            verbose,
        } => commands::diff::run(
            &old,
            &new,
            key,
            ignored,
            reference,
            format,
            output,
            on_extra_sheets,
            quiet,
            verbose,
        ),
        Commands::Info { path } => commands::info::run(&path),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for_error(&e)
        }
    }
}

fn exit_code_for_error(err: &anyhow::Error) -> ExitCode {
    if is_internal_error(err) {
        ExitCode::from(3)
    } else {
        ExitCode::from(2)
    }
}

fn is_internal_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(compare_err) = cause.downcast_ref::<CompareError>() {
            return matches!(compare_err, CompareError::Internal { .. });
        }
        if cause.is::<ConfigError>() {
            return false;
        }
        cause.is::<OpenError>() || cause.is::<ContainerError>() || cause.is::<SheetParseError>()
    })
}
