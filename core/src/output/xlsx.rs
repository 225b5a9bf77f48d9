//! Formatted `.xlsx` report writing.
//!
//! Each sheet with differences becomes one worksheet in the comparison
//! workbook, with "Changed", "Added", and "Deleted" blocks stacked
//! vertically. The changed block carries two header rows: the outer row is
//! the original column name (merged across its old/new pair), the inner row
//! is the two input files' labels, with `-` under reference columns.

use crate::diff::{ChangedTable, CompareReport};
use crate::table::{Table, Value};
use log::info;
use rust_xlsxwriter::{Format, FormatAlign, Workbook as XlsxWorkbook, Worksheet, XlsxError};
use std::path::Path;

/// Write the comparison workbook to `path`, skipping unchanged sheets.
pub fn write_xlsx_report(report: &CompareReport, path: impl AsRef<Path>) -> Result<(), XlsxError> {
    let mut workbook = build_report_workbook(report)?;
    workbook.save(path.as_ref())?;
    info!("wrote comparison workbook to {}", path.as_ref().display());
    Ok(())
}

/// Build the comparison workbook in memory.
pub fn build_report_workbook(report: &CompareReport) -> Result<XlsxWorkbook, XlsxError> {
    let mut workbook = XlsxWorkbook::new();
    let title_format = Format::new().set_bold();
    let header_format = Format::new().set_bold().set_align(FormatAlign::Center);

    for (position, sheet) in report.changed_sheets().enumerate() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(worksheet_name(&sheet.display_name().to_string(), position))?;

        let mut row = 0u32;
        if !sheet.diff.changed.is_empty() {
            row = write_changed_block(
                worksheet,
                &sheet.diff.changed,
                row,
                &title_format,
                &header_format,
            )?;
        }
        if !sheet.diff.added.is_empty() {
            row = write_table_block(
                worksheet,
                "Added",
                &sheet.diff.added,
                row,
                &title_format,
            )?;
        }
        if !sheet.diff.deleted.is_empty() {
            write_table_block(
                worksheet,
                "Deleted",
                &sheet.diff.deleted,
                row,
                &title_format,
            )?;
        }
    }

    Ok(workbook)
}

/// A legal worksheet name: the forbidden characters replaced, truncated to
/// Excel's 31-character limit, never empty.
fn worksheet_name(name: &str, position: usize) -> String {
    let mut cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    if cleaned.is_empty() {
        cleaned = format!("Sheet{}", position + 1);
    }
    cleaned.chars().take(31).collect()
}

fn write_changed_block(
    worksheet: &mut Worksheet,
    changed: &ChangedTable,
    start_row: u32,
    title_format: &Format,
    header_format: &Format,
) -> Result<u32, XlsxError> {
    worksheet.write_string_with_format(start_row, 0, "Changed", title_format)?;

    let outer_row = start_row + 1;
    let inner_row = start_row + 2;
    let mut col = 0u16;

    // Key column occupies a single header cell spanning both header rows.
    worksheet.write_string_with_format(outer_row, col, &changed.key_name.to_string(), header_format)?;
    col += 1;

    for reference in &changed.reference_columns {
        worksheet.write_string_with_format(outer_row, col, &reference.name.to_string(), header_format)?;
        worksheet.write_string(inner_row, col, "-")?;
        col += 1;
    }

    for column in &changed.columns {
        worksheet.merge_range(
            outer_row,
            col,
            outer_row,
            col + 1,
            &column.name.to_string(),
            header_format,
        )?;
        worksheet.write_string(inner_row, col, &changed.old_label)?;
        worksheet.write_string(inner_row, col + 1, &changed.new_label)?;
        col += 2;
    }

    let data_start = start_row + 3;
    for (offset, key) in changed.keys.iter().enumerate() {
        let row = data_start + offset as u32;
        let mut col = 0u16;

        write_value(worksheet, row, col, key)?;
        col += 1;

        for reference in &changed.reference_columns {
            write_value(worksheet, row, col, &reference.values[offset])?;
            col += 1;
        }

        for column in &changed.columns {
            write_value(worksheet, row, col, &column.old[offset])?;
            write_value(worksheet, row, col + 1, &column.new[offset])?;
            col += 2;
        }
    }

    // Blank separator row after the block.
    Ok(data_start + changed.nrows() as u32 + 1)
}

fn write_table_block(
    worksheet: &mut Worksheet,
    title: &str,
    table: &Table,
    start_row: u32,
    title_format: &Format,
) -> Result<u32, XlsxError> {
    worksheet.write_string_with_format(start_row, 0, title, title_format)?;

    let header_row = start_row + 1;
    for (col, column) in table.columns.iter().enumerate() {
        worksheet.write_string(header_row, col as u16, &column.name.to_string())?;
    }

    let data_start = start_row + 2;
    for (col, column) in table.columns.iter().enumerate() {
        for (offset, value) in column.values.iter().enumerate() {
            write_value(worksheet, data_start + offset as u32, col as u16, value)?;
        }
    }

    Ok(data_start + table.nrows() as u32 + 1)
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> Result<(), XlsxError> {
    match value {
        Value::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        Value::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Blank => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::worksheet_name;

    #[test]
    fn worksheet_names_are_sanitized_and_bounded() {
        assert_eq!(worksheet_name("Prices", 0), "Prices");
        assert_eq!(worksheet_name("a/b:c", 0), "a_b_c");
        assert_eq!(worksheet_name("", 2), "Sheet3");
        assert_eq!(worksheet_name(&"x".repeat(40), 0).chars().count(), 31);
    }
}
