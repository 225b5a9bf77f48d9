//! Comparison results and errors.
//!
//! This module defines the types a comparison produces:
//! - [`SheetDiff`]: one sheet's `changed` / `added` / `deleted` trio
//! - [`ChangedTable`]: the sparse cell-level diff of rows present in both
//! - [`CompareReport`]: the versioned whole-run result
//! - [`CompareError`]: errors that abort a comparison

use crate::error_codes;
use crate::label::Label;
use crate::table::{Column, Table, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by comparison APIs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompareError {
    #[error(
        "[SHDIFF_CMP_001] cannot compare sheet '{sheet}': key value '{key}' occurs more than once on a side present in both versions (likely duplicate index). Suggestion: de-duplicate the key column or align on a different key."
    )]
    AmbiguousKey { sheet: Label, key: String },

    #[error(
        "[SHDIFF_CMP_002] key column '{column}' not found in sheet '{sheet}'. Available columns: {}. Suggestion: check the column name and casing.", available.join(", ")
    )]
    MissingKey {
        sheet: Label,
        column: Label,
        available: Vec<String>,
    },

    #[error(
        "[SHDIFF_CMP_003] workbooks have different sheet counts (old: {old}, new: {new}). Suggestion: set on_sheet_count_mismatch to warn_and_truncate or diff_unpaired to compare anyway."
    )]
    SheetCountMismatch { old: usize, new: usize },

    #[error("[SHDIFF_CMP_004] internal error: {message}. Suggestion: report a bug with the input files if possible.")]
    Internal { message: String },
}

impl CompareError {
    pub fn code(&self) -> &'static str {
        match self {
            CompareError::AmbiguousKey { .. } => error_codes::CMP_AMBIGUOUS_KEY,
            CompareError::MissingKey { .. } => error_codes::CMP_MISSING_KEY,
            CompareError::SheetCountMismatch { .. } => error_codes::CMP_SHEET_COUNT_MISMATCH,
            CompareError::Internal { .. } => error_codes::CMP_INTERNAL,
        }
    }
}

/// One compared column of the changed-table: old and new values side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedColumn {
    pub name: Label,
    pub old: Vec<Value>,
    pub new: Vec<Value>,
}

/// The sparse cell-level diff of rows present in both versions.
///
/// Only columns where at least one row differs are present, and only rows
/// where at least one column differs. Within an included row, cells that did
/// not change are [`Value::Blank`] on both sides.
///
/// Headers are two-level: the outer level is the original column name, the
/// inner level is `old_label` / `new_label` (the input files' base names).
/// Reference columns are single-level context prepended to the left; they
/// are never diffed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangedTable {
    pub key_name: Label,
    pub old_label: String,
    pub new_label: String,
    /// Key value of each changed row.
    pub keys: Vec<Value>,
    /// Context columns from the old table, aligned with `keys`.
    pub reference_columns: Vec<Column>,
    /// Differing columns, aligned with `keys`.
    pub columns: Vec<ChangedColumn>,
}

impl ChangedTable {
    pub fn nrows(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// One sheet's comparison outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetDiff {
    pub changed: ChangedTable,
    /// Full rows whose key exists only in the new table.
    pub added: Table,
    /// Full rows whose key exists only in the old table.
    pub deleted: Table,
}

impl SheetDiff {
    /// True when the sheet is unchanged: nothing added, deleted, or changed.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.added.is_empty() && self.deleted.is_empty()
    }
}

/// A per-sheet entry of the report.
///
/// Pairing is positional, so the two sides can carry different names; an
/// unpaired sheet has a name on one side only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetReport {
    pub old_name: Option<Label>,
    pub new_name: Option<Label>,
    pub diff: SheetDiff,
}

impl SheetReport {
    /// The name a reader should see for this sheet: the new name when the
    /// sheet still exists, otherwise the old one.
    pub fn display_name(&self) -> &Label {
        self.new_name
            .as_ref()
            .or(self.old_name.as_ref())
            .expect("a sheet report carries at least one name")
    }
}

/// A versioned whole-run comparison result.
///
/// # Incomplete results
///
/// Advisory conditions (sheet-count mismatch under the default behavior,
/// skipped reference columns) do not abort the run. In that case:
///
/// - `complete == false`
/// - `warnings` contains at least one human-readable explanation
///
/// The CLI prints warnings to stderr as `Warning: ...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareReport {
    /// Schema version (currently "1").
    pub version: String,
    /// Per-sheet results, in old-workbook order; unchanged sheets included.
    pub sheets: Vec<SheetReport>,
    #[serde(default = "default_complete")]
    pub complete: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn default_complete() -> bool {
    true
}

impl CompareReport {
    pub const SCHEMA_VERSION: &'static str = "1";

    pub fn new(sheets: Vec<SheetReport>) -> CompareReport {
        CompareReport {
            version: Self::SCHEMA_VERSION.to_string(),
            sheets,
            complete: true,
            warnings: Vec::new(),
        }
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
        self.complete = false;
    }

    /// True when any sheet has differences.
    pub fn has_differences(&self) -> bool {
        self.sheets.iter().any(|s| !s.diff.is_empty())
    }

    /// Sheets with at least one difference, in report order.
    pub fn changed_sheets(&self) -> impl Iterator<Item = &SheetReport> {
        self.sheets.iter().filter(|s| !s.diff.is_empty())
    }
}
