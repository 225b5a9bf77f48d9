//! Column reconciliation.
//!
//! Before two tables can be compared cell-by-cell they must share a column
//! set: columns present on only one side have nothing to be compared
//! against, and explicitly ignored columns are excluded everywhere.
//! Reconciliation computes that common set and returns trimmed copies of
//! both tables, leaving the caller's tables untouched.

use crate::config::KeySpec;
use crate::label::Label;
use crate::table::{Column, Table};
use std::collections::BTreeSet;

/// Return copies of `old` and `new` restricted to the columns eligible for
/// comparison: present in both tables and not ignored.
///
/// The key column is exempt: alignment owns it, so it survives even when
/// it is one-sided or ignored. Column order within each table is preserved.
pub fn reconcile_columns(
    old: &Table,
    new: &Table,
    key: &KeySpec,
    ignored: &BTreeSet<Label>,
) -> (Table, Table) {
    let old_names: BTreeSet<&Label> = old.column_names().collect();
    let new_names: BTreeSet<&Label> = new.column_names().collect();

    let mut drop: BTreeSet<&Label> = old_names.symmetric_difference(&new_names).copied().collect();
    drop.extend(ignored.iter());

    if let KeySpec::Column(key_name) = key {
        drop.remove(key_name);
    }

    (retain_columns(old, &drop), retain_columns(new, &drop))
}

fn retain_columns(table: &Table, drop: &BTreeSet<&Label>) -> Table {
    let columns: Vec<Column> = table
        .columns
        .iter()
        .filter(|c| !drop.contains(&c.name))
        .cloned()
        .collect();
    Table::from_columns(columns)
}
