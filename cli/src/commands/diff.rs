use crate::output::{json, text};
use crate::{ExtraSheets, OutputFormat};
use anyhow::{Context, Result};
use sheet_diff::{
    CompareConfig, CompareReport, SheetCountBehavior, compare_workbooks, open_workbook,
    write_xlsx_report,
};
use std::io;
use std::path::Path;
use std::process::ExitCode;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    old_path: &str,
    new_path: &str,
    key: Option<String>,
    ignored: Vec<String>,
    reference: Vec<String>,
    format: OutputFormat,
    output: Option<String>,
    on_extra_sheets: ExtraSheets,
    quiet: bool,
    verbose: bool,
) -> Result<ExitCode> {
    let verbosity = if quiet {
        Verbosity::Quiet
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    let config = build_config(key, ignored, reference, on_extra_sheets)
        .context("Invalid comparison options")?;
    log::debug!("comparing '{}' against '{}'", old_path, new_path);

    let old = open_workbook(old_path)
        .with_context(|| format!("Failed to open old workbook: {}", old_path))?;
    let new = open_workbook(new_path)
        .with_context(|| format!("Failed to open new workbook: {}", new_path))?;

    let report = compare_workbooks(
        &old,
        &new,
        &config,
        &file_label(old_path),
        &file_label(new_path),
    )
    .context("Comparison failed")?;

    print_warnings_to_stderr(&report);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match format {
        OutputFormat::Text => text::write_text_report(&mut handle, &report, verbosity)?,
        OutputFormat::Json => json::write_json_report(&mut handle, &report)?,
    }

    if let Some(path) = output {
        if report.has_differences() {
            write_xlsx_report(&report, &path)
                .with_context(|| format!("Failed to write comparison workbook: {}", path))?;
            eprintln!("Wrote comparison workbook to {}", path);
        } else {
            eprintln!("No differences found; skipping comparison workbook.");
        }
    }

    Ok(exit_code_from_report(&report))
}

fn build_config(
    key: Option<String>,
    ignored: Vec<String>,
    reference: Vec<String>,
    on_extra_sheets: ExtraSheets,
) -> Result<CompareConfig, sheet_diff::ConfigError> {
    let mut builder = CompareConfig::builder().ignore_columns(ignored);
    if let Some(key) = key {
        builder = builder.key_column(key);
    }
    for column in reference {
        builder = builder.reference_column(column);
    }
    builder
        .on_sheet_count_mismatch(match on_extra_sheets {
            ExtraSheets::Warn => SheetCountBehavior::WarnAndTruncate,
            ExtraSheets::Diff => SheetCountBehavior::DiffUnpaired,
            ExtraSheets::Error => SheetCountBehavior::Error,
        })
        .build()
}

/// The label a side gets in the changed-table headers: the file's base name.
fn file_label(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn print_warnings_to_stderr(report: &CompareReport) {
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
}

fn exit_code_from_report(report: &CompareReport) -> ExitCode {
    if !report.has_differences() && report.complete {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::file_label;

    #[test]
    fn file_label_is_the_base_name() {
        assert_eq!(file_label("data/prices_v2.xlsx"), "prices_v2");
        assert_eq!(file_label("plain"), "plain");
    }
}
