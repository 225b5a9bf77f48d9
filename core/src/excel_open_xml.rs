//! Excel Open XML file loading.
//!
//! Opens `.xlsx` files and turns each worksheet into a [`Table`]: the first
//! row is the header row (its cells become column labels), the remaining
//! rows are data.

use crate::container::{ContainerError, OpcContainer};
use crate::error_codes;
use crate::label::Label;
use crate::sheet_parser::{
    SheetParseError, parse_relationships, parse_shared_strings, parse_sheet_xml,
    parse_workbook_xml, resolve_sheet_target,
};
use crate::table::{Table, Value};
use crate::workbook::{Sheet, Workbook};
use log::debug;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpenError {
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
    #[error("sheet parse error: {0}")]
    Parse(#[from] SheetParseError),
    #[error("workbook.xml missing or unreadable")]
    WorkbookXmlMissing,
    #[error("worksheet XML missing for sheet {sheet_name}")]
    WorksheetXmlMissing { sheet_name: String },
}

impl OpenError {
    pub fn code(&self) -> &'static str {
        match self {
            OpenError::Container(_) => error_codes::OPEN_CONTAINER,
            OpenError::Parse(_) => error_codes::OPEN_PARSE,
            OpenError::WorkbookXmlMissing => error_codes::OPEN_WORKBOOK_XML_MISSING,
            OpenError::WorksheetXmlMissing { .. } => error_codes::OPEN_WORKSHEET_XML_MISSING,
        }
    }
}

/// Open an `.xlsx` file as a [`Workbook`], preserving sheet and column order.
pub fn open_workbook(path: impl AsRef<Path>) -> Result<Workbook, OpenError> {
    let mut container = OpcContainer::open_from_path(path.as_ref())?;
    open_workbook_from_container(&mut container)
}

/// Open an `.xlsx` workbook from any seekable reader.
pub fn open_workbook_from_reader<R: std::io::Read + std::io::Seek + 'static>(
    reader: R,
) -> Result<Workbook, OpenError> {
    let mut container = OpcContainer::open_from_reader(reader)?;
    open_workbook_from_container(&mut container)
}

fn open_workbook_from_container(container: &mut OpcContainer) -> Result<Workbook, OpenError> {
    let shared_strings = match container.read_file_optional("xl/sharedStrings.xml")? {
        Some(bytes) => parse_shared_strings(&bytes)?,
        None => Vec::new(),
    };

    let workbook_bytes = container
        .read_file("xl/workbook.xml")
        .map_err(|_| OpenError::WorkbookXmlMissing)?;
    let descriptors = parse_workbook_xml(&workbook_bytes)?;

    let relationships = match container.read_file_optional("xl/_rels/workbook.xml.rels")? {
        Some(bytes) => parse_relationships(&bytes)?,
        None => HashMap::new(),
    };

    let mut sheets = Vec::with_capacity(descriptors.len());
    for (idx, descriptor) in descriptors.iter().enumerate() {
        let target = resolve_sheet_target(descriptor, &relationships, idx);
        let sheet_bytes =
            container
                .read_file(&target)
                .map_err(|_| OpenError::WorksheetXmlMissing {
                    sheet_name: descriptor.name.clone(),
                })?;
        let rows = parse_sheet_xml(&sheet_bytes, &shared_strings)?;
        let table = table_from_rows(rows);
        debug!(
            "loaded sheet '{}': {} rows x {} columns",
            descriptor.name,
            table.nrows(),
            table.ncols()
        );
        sheets.push(Sheet {
            name: Label::text(&descriptor.name),
            table,
        });
    }

    Ok(Workbook { sheets })
}

/// Turn raw row-major sheet data into a table: first row is the header.
fn table_from_rows(mut rows: Vec<Vec<Value>>) -> Table {
    if rows.is_empty() {
        return Table::new();
    }

    let header = rows.remove(0);
    let names = header
        .into_iter()
        .enumerate()
        .map(|(col, value)| header_label(col, value))
        .collect();

    Table::from_rows(names, rows)
}

/// A header cell's column label. Blank headers fall back to the column's
/// position so the column stays addressable.
fn header_label(col: usize, value: Value) -> Label {
    match value {
        Value::Text(s) => Label::Text(s),
        Value::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
            Label::Index(n as i64)
        }
        Value::Number(n) => Label::Text(n.to_string()),
        Value::Bool(b) => Label::Text(b.to_string()),
        Value::Blank => Label::Index(col as i64),
    }
}
