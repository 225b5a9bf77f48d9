//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use sheet_diff::{CompareConfig, Label, Sheet, Table, Value, Workbook};

/// Build a table from a header and literal rows.
pub fn table(names: &[&str], rows: &[&[Value]]) -> Table {
    Table::from_rows(
        names.iter().map(|&n| Label::from(n)).collect(),
        rows.iter().map(|r| r.to_vec()).collect(),
    )
}

/// Shorthand for a `(id, val)` table keyed by a numeric id column.
pub fn id_val_table(rows: &[(f64, &str)]) -> Table {
    Table::from_rows(
        vec!["id".into(), "val".into()],
        rows.iter()
            .map(|&(id, val)| vec![Value::Number(id), Value::text(val)])
            .collect(),
    )
}

pub fn workbook(sheets: Vec<(&str, Table)>) -> Workbook {
    Workbook::new(
        sheets
            .into_iter()
            .map(|(name, table)| Sheet::new(name, table))
            .collect(),
    )
}

pub fn id_key_config() -> CompareConfig {
    CompareConfig::builder()
        .key_column("id")
        .build()
        .expect("config should validate")
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}

pub fn text(s: &str) -> Value {
    Value::text(s)
}
