use anyhow::Result;
use sheet_diff::{CompareReport, serialize_report_pretty};
use std::io::Write;

pub fn write_json_report<W: Write>(w: &mut W, report: &CompareReport) -> Result<()> {
    let json = serialize_report_pretty(report)?;
    writeln!(w, "{}", json)?;
    Ok(())
}
