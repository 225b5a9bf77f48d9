use crate::commands::diff::Verbosity;
use anyhow::Result;
use sheet_diff::{ChangedTable, CompareReport, SheetReport, Table, Value};
use std::io::Write;

pub fn write_text_report<W: Write>(
    w: &mut W,
    report: &CompareReport,
    verbosity: Verbosity,
) -> Result<()> {
    if !report.has_differences() {
        writeln!(w, "No differences found.")?;
        write_summary(w, report)?;
        return Ok(());
    }

    for sheet in &report.sheets {
        if sheet.diff.is_empty() {
            if verbosity == Verbosity::Verbose {
                writeln!(w, "Sheet \"{}\": unchanged", sheet.display_name())?;
                writeln!(w)?;
            }
            continue;
        }

        writeln!(w, "Sheet \"{}\":", sheet.display_name())?;
        if verbosity != Verbosity::Quiet {
            write_sheet_rows(w, sheet)?;
        } else {
            write_sheet_counts(w, sheet)?;
        }
        writeln!(w)?;
    }

    write_summary(w, report)?;
    Ok(())
}

fn write_sheet_counts<W: Write>(w: &mut W, sheet: &SheetReport) -> Result<()> {
    writeln!(
        w,
        "  {} changed, {} added, {} deleted",
        sheet.diff.changed.nrows(),
        sheet.diff.added.nrows(),
        sheet.diff.deleted.nrows()
    )?;
    Ok(())
}

fn write_sheet_rows<W: Write>(w: &mut W, sheet: &SheetReport) -> Result<()> {
    for line in render_changed(&sheet.diff.changed) {
        writeln!(w, "  {}", line)?;
    }
    for line in render_rows(&sheet.diff.added, "ADDED") {
        writeln!(w, "  {}", line)?;
    }
    for line in render_rows(&sheet.diff.deleted, "REMOVED") {
        writeln!(w, "  {}", line)?;
    }
    Ok(())
}

fn render_changed(changed: &ChangedTable) -> Vec<String> {
    let mut lines = Vec::with_capacity(changed.nrows());
    for row in 0..changed.nrows() {
        let mut edits = Vec::new();
        for column in &changed.columns {
            let old = &column.old[row];
            let new = &column.new[row];
            if old.is_blank() && new.is_blank() {
                continue;
            }
            edits.push(format!(
                "{}: {} -> {}",
                column.name,
                render_value(old),
                render_value(new)
            ));
        }

        let mut line = format!(
            "{} {}: CHANGED  {}",
            changed.key_name,
            changed.keys[row],
            edits.join("; ")
        );
        if !changed.reference_columns.is_empty() {
            let refs: Vec<String> = changed
                .reference_columns
                .iter()
                .map(|c| format!("{}={}", c.name, render_value(&c.values[row])))
                .collect();
            line.push_str(&format!("  ({})", refs.join(", ")));
        }
        lines.push(line);
    }
    lines
}

fn render_rows(table: &Table, tag: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(table.nrows());
    let Some(key_column) = table.columns.first() else {
        return lines;
    };

    for row in 0..table.nrows() {
        let values: Vec<String> = table.columns[1..]
            .iter()
            .map(|c| format!("{}={}", c.name, render_value(&c.values[row])))
            .collect();
        lines.push(format!(
            "{} {}: {}  {}",
            key_column.name,
            key_column.values[row],
            tag,
            values.join(", ")
        ));
    }
    lines
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("\"{}\"", s),
        Value::Blank => "(blank)".to_string(),
        other => other.to_string(),
    }
}

fn write_summary<W: Write>(w: &mut W, report: &CompareReport) -> Result<()> {
    let with_differences = report.changed_sheets().count();
    writeln!(
        w,
        "{} sheet(s) compared, {} with differences.",
        report.sheets.len(),
        with_differences
    )?;
    Ok(())
}
