//! Cell-level comparison of matched rows.
//!
//! Produces the sparse [`ChangedTable`]: only columns in which at least one
//! matched pair differs, only rows in which at least one column differs, and
//! [`Value::Blank`] for the cells of an included row that did not change.

use crate::align::RowAlignment;
use crate::config::CompareConfig;
use crate::diff::{ChangedColumn, ChangedTable, CompareError};
use crate::label::Label;
use crate::table::{Column, Table, Value};

/// Inputs the differ needs beyond the reconciled tables themselves.
pub struct DiffLabels<'a> {
    /// Inner header for old-side values (the old file's base name).
    pub old: &'a str,
    /// Inner header for new-side values (the new file's base name).
    pub new: &'a str,
}

/// Compare the matched rows of `old` and `new` column by column.
///
/// `old` and `new` are the reconciled tables; `original_old` is the
/// pre-reconciliation old table, used only to source reference-column
/// values. Fails with [`CompareError::AmbiguousKey`] when the alignment
/// carries duplicate-key clusters; pairing those rows arbitrarily would
/// produce a materially wrong diff.
#[allow(clippy::too_many_arguments)]
pub fn diff_cells(
    sheet: &Label,
    old: &Table,
    new: &Table,
    original_old: &Table,
    alignment: &RowAlignment,
    config: &CompareConfig,
    labels: &DiffLabels<'_>,
    warnings: &mut Vec<String>,
) -> Result<ChangedTable, CompareError> {
    if let Some(cluster) = alignment.duplicates.first() {
        return Err(CompareError::AmbiguousKey {
            sheet: sheet.clone(),
            key: cluster.key.to_string(),
        });
    }

    let key_name = config.key.output_label();
    let compared: Vec<&Column> = old
        .columns
        .iter()
        .filter(|c| c.name != key_name && !config.is_reference(&c.name))
        .collect();

    // Rows first: a row is included as soon as any compared column differs.
    let mut changed_pairs: Vec<(usize, usize)> = Vec::new();
    for &(old_row, new_row) in &alignment.matched {
        let differs = compared.iter().any(|column| {
            let old_value = &column.values[old_row];
            let new_value = new
                .value(new_row, &column.name)
                .unwrap_or(&Value::Blank);
            old_value != new_value
        });
        if differs {
            changed_pairs.push((old_row, new_row));
        }
    }

    let old_keys = crate::align::extract_keys(old, &config.key, sheet)?;
    let keys: Vec<Value> = changed_pairs
        .iter()
        .map(|&(old_row, _)| old_keys[old_row].clone())
        .collect();

    // Then columns: restricted to the included rows, keep a column only if
    // it differs somewhere, and blank out its non-differing cells.
    let mut columns: Vec<ChangedColumn> = Vec::new();
    for column in compared {
        let mut old_values = Vec::with_capacity(changed_pairs.len());
        let mut new_values = Vec::with_capacity(changed_pairs.len());
        let mut any_differ = false;

        for &(old_row, new_row) in &changed_pairs {
            let old_value = &column.values[old_row];
            let new_value = new.value(new_row, &column.name).unwrap_or(&Value::Blank);
            if old_value == new_value {
                old_values.push(Value::Blank);
                new_values.push(Value::Blank);
            } else {
                any_differ = true;
                old_values.push(old_value.clone());
                new_values.push(new_value.clone());
            }
        }

        if any_differ {
            columns.push(ChangedColumn {
                name: column.name.clone(),
                old: old_values,
                new: new_values,
            });
        }
    }

    let reference_columns = if keys.is_empty() {
        Vec::new()
    } else {
        collect_reference_columns(sheet, original_old, &changed_pairs, config, warnings)
    };

    Ok(ChangedTable {
        key_name,
        old_label: labels.old.to_string(),
        new_label: labels.new.to_string(),
        keys,
        reference_columns,
        columns,
    })
}

/// Reference-column values for the changed rows, taken from the old table
/// as authored (before reconciliation), so a reference column survives even
/// when it is not common to both files.
fn collect_reference_columns(
    sheet: &Label,
    original_old: &Table,
    changed_pairs: &[(usize, usize)],
    config: &CompareConfig,
    warnings: &mut Vec<String>,
) -> Vec<Column> {
    let mut columns = Vec::with_capacity(config.reference_columns.len());
    for name in &config.reference_columns {
        let Some(source) = original_old.column(name) else {
            warnings.push(format!(
                "Sheet '{}': reference column '{}' not found in the old table; skipping it.",
                sheet, name
            ));
            continue;
        };
        columns.push(Column {
            name: name.clone(),
            values: changed_pairs
                .iter()
                .map(|&(old_row, _)| source.values.get(old_row).cloned().unwrap_or(Value::Blank))
                .collect(),
        });
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align_rows;
    use crate::config::{CompareConfig, KeySpec};
    use crate::reconcile::reconcile_columns;

    const LABELS: DiffLabels<'static> = DiffLabels {
        old: "old_book",
        new: "new_book",
    };

    fn config_with_key() -> CompareConfig {
        CompareConfig::builder()
            .key_column("id")
            .build()
            .expect("config")
    }

    fn run_diff(
        old: &Table,
        new: &Table,
        config: &CompareConfig,
    ) -> Result<(ChangedTable, Vec<String>), CompareError> {
        let sheet: Label = "s".into();
        let (old_r, new_r) = reconcile_columns(old, new, &config.key, &config.ignored_columns);
        let alignment = align_rows(&old_r, &new_r, &config.key, &sheet)?;
        let mut warnings = Vec::new();
        let changed = diff_cells(
            &sheet, &old_r, &new_r, old, &alignment, config, &LABELS, &mut warnings,
        )?;
        Ok((changed, warnings))
    }

    fn two_col_table(rows: &[(f64, &str)]) -> Table {
        Table::from_rows(
            vec!["id".into(), "val".into()],
            rows.iter()
                .map(|&(id, val)| vec![Value::Number(id), Value::text(val)])
                .collect(),
        )
    }

    #[test]
    fn identical_tables_produce_empty_changed() {
        let table = two_col_table(&[(1.0, "a"), (2.0, "b")]);
        let (changed, warnings) = run_diff(&table, &table, &config_with_key()).expect("diff");
        assert!(changed.is_empty());
        assert!(changed.columns.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn single_cell_edit_is_reported() {
        let old = two_col_table(&[(1.0, "a")]);
        let new = two_col_table(&[(1.0, "b")]);
        let (changed, _) = run_diff(&old, &new, &config_with_key()).expect("diff");

        assert_eq!(changed.keys, vec![Value::Number(1.0)]);
        assert_eq!(changed.columns.len(), 1);
        assert_eq!(changed.columns[0].name, Label::text("val"));
        assert_eq!(changed.columns[0].old, vec![Value::text("a")]);
        assert_eq!(changed.columns[0].new, vec![Value::text("b")]);
        assert_eq!(changed.old_label, "old_book");
        assert_eq!(changed.new_label, "new_book");
    }

    #[test]
    fn unchanged_cells_in_changed_rows_are_blank() {
        let old = Table::from_rows(
            vec!["id".into(), "a".into(), "b".into()],
            vec![
                vec![Value::Number(1.0), Value::text("x"), Value::text("same")],
                vec![Value::Number(2.0), Value::text("keep"), Value::text("u")],
            ],
        );
        let new = Table::from_rows(
            vec!["id".into(), "a".into(), "b".into()],
            vec![
                vec![Value::Number(1.0), Value::text("y"), Value::text("same")],
                vec![Value::Number(2.0), Value::text("keep"), Value::text("v")],
            ],
        );
        let (changed, _) = run_diff(&old, &new, &config_with_key()).expect("diff");

        assert_eq!(changed.nrows(), 2);
        let col_a = changed.columns.iter().find(|c| c.name == "a".into()).unwrap();
        let col_b = changed.columns.iter().find(|c| c.name == "b".into()).unwrap();
        // Row for id=1 changed in 'a' only; its 'b' cells are blank.
        assert_eq!(col_a.old[0], Value::text("x"));
        assert_eq!(col_b.old[0], Value::Blank);
        // Row for id=2 changed in 'b' only; its 'a' cells are blank.
        assert_eq!(col_a.old[1], Value::Blank);
        assert_eq!(col_b.new[1], Value::text("v"));
    }

    #[test]
    fn columns_without_any_difference_are_omitted() {
        let old = Table::from_rows(
            vec!["id".into(), "a".into(), "b".into()],
            vec![vec![Value::Number(1.0), Value::text("x"), Value::text("same")]],
        );
        let new = Table::from_rows(
            vec!["id".into(), "a".into(), "b".into()],
            vec![vec![Value::Number(1.0), Value::text("y"), Value::text("same")]],
        );
        let (changed, _) = run_diff(&old, &new, &config_with_key()).expect("diff");

        assert_eq!(changed.columns.len(), 1);
        assert_eq!(changed.columns[0].name, Label::text("a"));
    }

    #[test]
    fn duplicate_key_cluster_fails_with_ambiguous_key() {
        let old = two_col_table(&[(1.0, "a"), (1.0, "b")]);
        let new = two_col_table(&[(1.0, "c")]);
        let err = run_diff(&old, &new, &config_with_key()).expect_err("duplicate keys");
        match err {
            CompareError::AmbiguousKey { sheet, key } => {
                assert_eq!(sheet, Label::text("s"));
                assert_eq!(key, "1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_vs_value_counts_as_difference() {
        let old = Table::from_rows(
            vec!["id".into(), "val".into()],
            vec![vec![Value::Number(1.0), Value::Blank]],
        );
        let new = two_col_table(&[(1.0, "filled")]);
        let (changed, _) = run_diff(&old, &new, &config_with_key()).expect("diff");

        assert_eq!(changed.nrows(), 1);
        assert_eq!(changed.columns[0].old, vec![Value::Blank]);
        assert_eq!(changed.columns[0].new, vec![Value::text("filled")]);
    }

    #[test]
    fn reference_columns_are_carried_not_compared() {
        let old = Table::from_rows(
            vec!["id".into(), "name".into(), "price".into()],
            vec![
                vec![Value::Number(1.0), Value::text("Widget"), Value::Number(10.0)],
                vec![Value::Number(2.0), Value::text("Gadget"), Value::Number(20.0)],
            ],
        );
        let new = Table::from_rows(
            vec!["id".into(), "name".into(), "price".into()],
            vec![
                // Name changed too, but as a reference column it is not diffed.
                vec![Value::Number(1.0), Value::text("Sprocket"), Value::Number(11.0)],
                vec![Value::Number(2.0), Value::text("Gadget"), Value::Number(20.0)],
            ],
        );
        let config = CompareConfig::builder()
            .key_column("id")
            .reference_column("name")
            .build()
            .expect("config");
        let (changed, warnings) = run_diff(&old, &new, &config).expect("diff");

        assert_eq!(changed.nrows(), 1, "only the price row changed");
        assert_eq!(changed.reference_columns.len(), 1);
        assert_eq!(
            changed.reference_columns[0].values,
            vec![Value::text("Widget")],
            "reference values come from the old table"
        );
        assert!(
            changed.columns.iter().all(|c| c.name != "name".into()),
            "reference column must not appear among diffed columns"
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_reference_column_warns_and_skips() {
        let old = two_col_table(&[(1.0, "a")]);
        let new = two_col_table(&[(1.0, "b")]);
        let config = CompareConfig::builder()
            .key_column("id")
            .reference_column("label")
            .build()
            .expect("config");
        let (changed, warnings) = run_diff(&old, &new, &config).expect("diff");

        assert!(changed.reference_columns.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("reference column 'label'"));
    }

    #[test]
    fn one_sided_reference_column_survives_reconciliation() {
        let old = Table::from_rows(
            vec!["id".into(), "name".into(), "val".into()],
            vec![vec![Value::Number(1.0), Value::text("Widget"), Value::text("a")]],
        );
        // 'name' exists only in the old file.
        let new = two_col_table(&[(1.0, "b")]);
        let config = CompareConfig::builder()
            .key_column("id")
            .reference_column("name")
            .build()
            .expect("config");
        let (changed, warnings) = run_diff(&old, &new, &config).expect("diff");

        assert_eq!(changed.reference_columns.len(), 1);
        assert_eq!(changed.reference_columns[0].values, vec![Value::text("Widget")]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn ignored_column_differences_do_not_register() {
        let old = Table::from_rows(
            vec!["id".into(), "val".into(), "notes".into()],
            vec![vec![Value::Number(1.0), Value::text("a"), Value::text("x")]],
        );
        let new = Table::from_rows(
            vec!["id".into(), "val".into(), "notes".into()],
            vec![vec![Value::Number(1.0), Value::text("a"), Value::text("y")]],
        );
        let config = CompareConfig::builder()
            .key_column("id")
            .ignore_column("notes")
            .build()
            .expect("config");
        let (changed, _) = run_diff(&old, &new, &config).expect("diff");
        assert!(changed.is_empty());
    }
}
