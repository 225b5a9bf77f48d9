//! Columnar table data structures.
//!
//! This module defines the in-memory representation a comparison runs over:
//! - [`Value`]: a single cell value
//! - [`Column`]: a named, ordered sequence of values
//! - [`Table`]: an ordered sequence of equal-length columns
//!
//! Tables are never mutated once built; every transformation (column
//! reconciliation, row selection) produces a fresh table.

use crate::hashing::normalize_float_for_hash;
use crate::label::Label;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A single cell value.
///
/// `Blank` is a first-class value rather than an `Option`: the cell differ
/// needs an explicit empty marker it can emit into sparse output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Blank,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Blank)
    }

    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(s) = self { Some(s) } else { None }
    }

    pub fn as_number(&self) -> Option<f64> {
        if let Value::Number(n) = self { Some(*n) } else { None }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self { Some(*b) } else { None }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                normalize_float_for_hash(*a) == normalize_float_for_hash(*b)
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Blank, Value::Blank) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Number(n) => {
                0u8.hash(state);
                normalize_float_for_hash(*n).hash(state);
            }
            Value::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
            Value::Bool(b) => {
                2u8.hash(state);
                b.hash(state);
            }
            Value::Blank => 3u8.hash(state),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Blank => Ok(()),
        }
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: Label,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<Label>, values: Vec<Value>) -> Column {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered sequence of named columns.
///
/// # Invariants
///
/// All columns hold the same number of values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Table {
        Table {
            columns: Vec::new(),
        }
    }

    pub fn from_columns(columns: Vec<Column>) -> Table {
        debug_assert!(
            columns.windows(2).all(|w| w[0].len() == w[1].len()),
            "all columns must hold the same number of values"
        );
        Table { columns }
    }

    /// Build a table from a header and row-major data, padding short rows
    /// with [`Value::Blank`] to keep the table rectangular.
    pub fn from_rows(names: Vec<Label>, rows: Vec<Vec<Value>>) -> Table {
        let ncols = names.len();
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::with_capacity(rows.len()),
            })
            .collect();

        for mut row in rows {
            row.resize(ncols, Value::Blank);
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }

        Table { columns }
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nrows() == 0
    }

    pub fn column(&self, name: &Label) -> Option<&Column> {
        self.columns.iter().find(|c| &c.name == name)
    }

    pub fn has_column(&self, name: &Label) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &Label> {
        self.columns.iter().map(|c| &c.name)
    }

    /// Value at `(row, column-name)`, if the column exists and the row is in
    /// bounds.
    pub fn value(&self, row: usize, name: &Label) -> Option<&Value> {
        self.column(name).and_then(|c| c.values.get(row))
    }

    /// A fresh table holding the given rows, in the given order, across all
    /// columns.
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                values: rows
                    .iter()
                    .map(|&r| column.values.get(r).cloned().unwrap_or(Value::Blank))
                    .collect(),
            })
            .collect();
        Table { columns }
    }
}
