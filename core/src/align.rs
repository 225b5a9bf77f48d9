//! Row alignment: the full outer join of two tables on their key.
//!
//! Every key from either table ends up in exactly one bucket: matched (one
//! row on each side), old-only, or new-only. A key that occurs more than
//! once on a side, while also present on the other side, cannot be paired
//! unambiguously; those rows are collected into duplicate clusters and the
//! cell differ decides what to do with them. A key duplicated on one side
//! only expands into that side's bucket, one entry per occurrence.

use crate::config::KeySpec;
use crate::diff::CompareError;
use crate::label::Label;
use crate::table::{Table, Value};
use rustc_hash::{FxHashMap, FxHashSet};

/// The outcome of aligning two tables on a key.
#[derive(Debug, Clone, PartialEq)]
pub struct RowAlignment {
    /// `(old_row, new_row)` pairs whose key occurs exactly once on each side.
    pub matched: Vec<(usize, usize)>,
    /// Rows whose key exists only in the old table.
    pub old_only: Vec<usize>,
    /// Rows whose key exists only in the new table.
    pub new_only: Vec<usize>,
    /// Keys present on both sides with more than one row on either side.
    pub duplicates: Vec<DuplicateKeyCluster>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateKeyCluster {
    pub key: Value,
    pub old_rows: Vec<usize>,
    pub new_rows: Vec<usize>,
}

impl RowAlignment {
    /// All keys, for the disjointness invariant checks.
    pub fn key_count(&self) -> usize {
        self.matched.len() + self.old_only.len() + self.new_only.len()
            + self.duplicates.len()
    }
}

/// Align `old` and `new` on `key`, classifying every key by provenance.
///
/// Fails with [`CompareError::MissingKey`] when the configured key column is
/// absent from either table. Key order in the result follows first
/// appearance: all of old's keys in old order, then new-only keys in new
/// order.
pub fn align_rows(
    old: &Table,
    new: &Table,
    key: &KeySpec,
    sheet: &Label,
) -> Result<RowAlignment, CompareError> {
    let old_keys = extract_keys(old, key, sheet)?;
    let new_keys = extract_keys(new, key, sheet)?;

    let old_lookup = build_lookup(&old_keys);
    let new_lookup = build_lookup(&new_keys);

    let mut ordered_keys: Vec<&Value> = Vec::new();
    let mut seen: FxHashSet<&Value> = FxHashSet::default();
    for key_value in old_keys.iter().chain(new_keys.iter()) {
        if seen.insert(key_value) {
            ordered_keys.push(key_value);
        }
    }

    let mut matched = Vec::new();
    let mut old_only = Vec::new();
    let mut new_only = Vec::new();
    let mut duplicates = Vec::new();

    for key_value in ordered_keys {
        let old_rows = old_lookup.get(key_value).map_or(&[][..], Vec::as_slice);
        let new_rows = new_lookup.get(key_value).map_or(&[][..], Vec::as_slice);

        match (old_rows, new_rows) {
            ([], []) => {}
            // One-sided keys expand per occurrence, duplicated or not.
            (rows, []) => old_only.extend_from_slice(rows),
            ([], rows) => new_only.extend_from_slice(rows),
            (&[o], &[n]) => matched.push((o, n)),
            // Present on both sides with at least one side duplicated.
            (o_rows, n_rows) => duplicates.push(DuplicateKeyCluster {
                key: key_value.clone(),
                old_rows: o_rows.to_vec(),
                new_rows: n_rows.to_vec(),
            }),
        }
    }

    Ok(RowAlignment {
        matched,
        old_only,
        new_only,
        duplicates,
    })
}

/// The key value of every row, in row order.
pub fn extract_keys(
    table: &Table,
    key: &KeySpec,
    sheet: &Label,
) -> Result<Vec<Value>, CompareError> {
    match key {
        KeySpec::Position => Ok((0..table.nrows()).map(|r| Value::Number(r as f64)).collect()),
        KeySpec::Column(name) => {
            let column = table.column(name).ok_or_else(|| CompareError::MissingKey {
                sheet: sheet.clone(),
                column: name.clone(),
                available: table.column_names().map(Label::to_string).collect(),
            })?;
            Ok(column.values.clone())
        }
    }
}

fn build_lookup(keys: &[Value]) -> FxHashMap<&Value, Vec<usize>> {
    let mut lookup: FxHashMap<&Value, Vec<usize>> = FxHashMap::default();
    for (row, key_value) in keys.iter().enumerate() {
        lookup.entry(key_value).or_default().push(row);
    }
    lookup
}
