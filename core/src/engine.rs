//! Comparison engine: per-sheet pipeline and workbook orchestration.
//!
//! The per-sheet pipeline is reconcile → align → cell-diff; the orchestrator
//! drives it once per positional sheet pair across the two workbooks and
//! assembles the [`CompareReport`].

use crate::align::align_rows;
use crate::cell_diff::{DiffLabels, diff_cells};
use crate::config::{CompareConfig, SheetCountBehavior};
use crate::diff::{CompareError, CompareReport, SheetDiff, SheetReport};
use crate::label::Label;
use crate::reconcile::reconcile_columns;
use crate::table::{Column, Table};
use crate::workbook::Workbook;
use log::{debug, info};

/// Compare two tables belonging to one sheet pair.
///
/// `labels` name the two sides in the changed-table's inner header (by
/// convention the input files' base names). Warnings accumulate into
/// `warnings`; errors abort.
pub fn compare_tables(
    sheet: &Label,
    old: &Table,
    new: &Table,
    config: &CompareConfig,
    labels: &DiffLabels<'_>,
    warnings: &mut Vec<String>,
) -> Result<SheetDiff, CompareError> {
    let (old_reconciled, new_reconciled) =
        reconcile_columns(old, new, &config.key, &config.ignored_columns);

    let alignment = align_rows(&old_reconciled, &new_reconciled, &config.key, sheet)?;
    debug!(
        "sheet '{}': {} keys ({} matched, {} old-only, {} new-only, {} ambiguous)",
        sheet,
        alignment.key_count(),
        alignment.matched.len(),
        alignment.old_only.len(),
        alignment.new_only.len(),
        alignment.duplicates.len()
    );

    let changed = diff_cells(
        sheet,
        &old_reconciled,
        &new_reconciled,
        old,
        &alignment,
        config,
        labels,
        warnings,
    )?;

    let added = select_keyed_rows(&new_reconciled, &alignment.new_only, config, sheet)?;
    let deleted = select_keyed_rows(&old_reconciled, &alignment.old_only, config, sheet)?;

    Ok(SheetDiff {
        changed,
        added,
        deleted,
    })
}

/// Compare two workbooks sheet-by-sheet, pairing positionally.
///
/// `old_label` / `new_label` become the changed-tables' inner header labels.
pub fn compare_workbooks(
    old: &Workbook,
    new: &Workbook,
    config: &CompareConfig,
    old_label: &str,
    new_label: &str,
) -> Result<CompareReport, CompareError> {
    let labels = DiffLabels {
        old: old_label,
        new: new_label,
    };

    let mut warnings = Vec::new();
    let paired = old.sheet_count().min(new.sheet_count());

    if old.sheet_count() != new.sheet_count() {
        match config.on_sheet_count_mismatch {
            SheetCountBehavior::Error => {
                return Err(CompareError::SheetCountMismatch {
                    old: old.sheet_count(),
                    new: new.sheet_count(),
                });
            }
            SheetCountBehavior::WarnAndTruncate => {
                warnings.push(format!(
                    "workbooks have different sheet counts (old: {}, new: {}); comparing the first {} sheet(s) positionally.",
                    old.sheet_count(),
                    new.sheet_count(),
                    paired
                ));
            }
            SheetCountBehavior::DiffUnpaired => {}
        }
    }

    let mut sheets = Vec::with_capacity(old.sheet_count().max(new.sheet_count()));

    for (old_sheet, new_sheet) in old.sheets.iter().zip(new.sheets.iter()) {
        info!("comparing sheet '{}'", old_sheet.name);
        let diff = compare_tables(
            &old_sheet.name,
            &old_sheet.table,
            &new_sheet.table,
            config,
            &labels,
            &mut warnings,
        )?;
        if diff.is_empty() {
            info!("sheet '{}' unchanged", old_sheet.name);
        }
        sheets.push(SheetReport {
            old_name: Some(old_sheet.name.clone()),
            new_name: Some(new_sheet.name.clone()),
            diff,
        });
    }

    if config.on_sheet_count_mismatch == SheetCountBehavior::DiffUnpaired {
        for old_sheet in &old.sheets[paired..] {
            info!("sheet '{}' has no counterpart; reporting as deleted", old_sheet.name);
            sheets.push(SheetReport {
                old_name: Some(old_sheet.name.clone()),
                new_name: None,
                diff: SheetDiff {
                    deleted: all_keyed_rows(&old_sheet.table, config, &old_sheet.name)?,
                    ..SheetDiff::default()
                },
            });
        }
        for new_sheet in &new.sheets[paired..] {
            info!("sheet '{}' has no counterpart; reporting as added", new_sheet.name);
            sheets.push(SheetReport {
                old_name: None,
                new_name: Some(new_sheet.name.clone()),
                diff: SheetDiff {
                    added: all_keyed_rows(&new_sheet.table, config, &new_sheet.name)?,
                    ..SheetDiff::default()
                },
            });
        }
    }

    let mut report = CompareReport::new(sheets);
    for warning in warnings {
        report.add_warning(warning);
    }
    Ok(report)
}

/// Select `rows` from `table` with the key rendered as the leftmost column,
/// mirroring how an indexed table is written out.
fn select_keyed_rows(
    table: &Table,
    rows: &[usize],
    config: &CompareConfig,
    sheet: &Label,
) -> Result<Table, CompareError> {
    if rows.is_empty() {
        return Ok(Table::new());
    }

    let keys = crate::align::extract_keys(table, &config.key, sheet)?;
    let key_name = config.key.output_label();

    let mut columns = Vec::with_capacity(table.ncols() + 1);
    columns.push(Column {
        name: key_name.clone(),
        values: rows.iter().map(|&r| keys[r].clone()).collect(),
    });

    let selected = table.select_rows(rows);
    columns.extend(
        selected
            .columns
            .into_iter()
            .filter(|c| c.name != key_name),
    );

    Ok(Table::from_columns(columns))
}

/// Every row of an unpaired sheet, keyed, with ignored columns still
/// excluded.
fn all_keyed_rows(
    table: &Table,
    config: &CompareConfig,
    sheet: &Label,
) -> Result<Table, CompareError> {
    let trimmed = Table::from_columns(
        table
            .columns
            .iter()
            .filter(|c| {
                !config.ignored_columns.contains(&c.name)
                    || config.key.output_label() == c.name
            })
            .cloned()
            .collect(),
    );
    let rows: Vec<usize> = (0..trimmed.nrows()).collect();
    select_keyed_rows(&trimmed, &rows, config, sheet)
}
