use anyhow::{Context, Result};
use sheet_diff::open_workbook;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

pub fn run(path: &str) -> Result<ExitCode> {
    let workbook =
        open_workbook(path).with_context(|| format!("Failed to open workbook: {}", path))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let filename = Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| path.into());

    writeln!(handle, "Workbook: {}", filename)?;
    writeln!(handle, "Sheets: {}", workbook.sheets.len())?;

    for sheet in &workbook.sheets {
        writeln!(
            handle,
            "  - \"{}\" {} rows x {} columns",
            sheet.name,
            sheet.table.nrows(),
            sheet.table.ncols()
        )?;
        let headers: Vec<String> = sheet
            .table
            .column_names()
            .map(|label| label.to_string())
            .collect();
        if !headers.is_empty() {
            writeln!(handle, "    columns: {}", headers.join(", "))?;
        }
    }

    Ok(ExitCode::from(0))
}
