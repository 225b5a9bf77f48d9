//! Workbook and sheet structures.

use crate::label::Label;
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// A workbook: an ordered sequence of named sheets.
///
/// Order matters: two workbooks are compared sheet-by-sheet by position,
/// not by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

/// A single sheet: a label and its table of data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: Label,
    pub table: Table,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Workbook {
        Workbook { sheets }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

impl Sheet {
    pub fn new(name: impl Into<Label>, table: Table) -> Sheet {
        Sheet {
            name: name.into(),
            table,
        }
    }
}
