mod common;

use common::{id_key_config, id_val_table, num, text, workbook};
use sheet_diff::{CompareReport, build_report_workbook, serialize_report};
use std::io::Cursor;

fn changed_report() -> CompareReport {
    let old = workbook(vec![
        ("Prices", id_val_table(&[(1.0, "a"), (2.0, "b")])),
        ("Stock", id_val_table(&[(7.0, "x")])),
    ]);
    let new = workbook(vec![
        ("Prices", id_val_table(&[(1.0, "changed"), (3.0, "c")])),
        ("Stock", id_val_table(&[(7.0, "x")])),
    ]);
    sheet_diff::compare_workbooks(&old, &new, &id_key_config(), "old_book", "new_book")
        .expect("compare")
}

#[test]
fn json_report_roundtrips() {
    let report = changed_report();
    let json = serialize_report(&report).expect("serialize report");
    let parsed: CompareReport = serde_json::from_str(&json).expect("deserialize report");
    assert_eq!(report, parsed);
    assert!(json.contains("\"version\":\"1\""));
    assert!(json.contains("old_book"));
}

#[test]
fn xlsx_report_is_a_valid_package_with_one_sheet_per_changed_sheet() {
    let report = changed_report();
    assert_eq!(report.changed_sheets().count(), 1, "Stock is unchanged");

    let mut book = build_report_workbook(&report).expect("build workbook");
    let buffer = book.save_to_buffer().expect("save to buffer");

    let mut archive =
        zip::ZipArchive::new(Cursor::new(buffer)).expect("report should be a valid ZIP");
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect();

    assert!(names.iter().any(|n| n == "[Content_Types].xml"));
    assert!(names.iter().any(|n| n == "xl/workbook.xml"));
    assert!(
        names.iter().any(|n| n == "xl/worksheets/sheet1.xml"),
        "one worksheet for the changed sheet"
    );
    assert!(
        !names.iter().any(|n| n == "xl/worksheets/sheet2.xml"),
        "unchanged sheets are skipped"
    );
}

#[cfg(feature = "excel-open-xml")]
#[test]
fn written_report_opens_with_the_workbook_loader() {
    let report = changed_report();
    let mut book = build_report_workbook(&report).expect("build workbook");
    let buffer = book.save_to_buffer().expect("save to buffer");

    let reloaded = sheet_diff::open_workbook_from_reader(Cursor::new(buffer))
        .expect("the written report should load back");
    assert_eq!(reloaded.sheets.len(), 1);
    assert_eq!(reloaded.sheets[0].name, sheet_diff::Label::text("Prices"));
    assert!(
        reloaded.sheets[0].table.nrows() > 0,
        "the report sheet carries the diff blocks"
    );
}

#[test]
fn unchanged_report_yields_no_report_worksheets() {
    let book = workbook(vec![("Prices", id_val_table(&[(1.0, "a")]))]);
    let report =
        sheet_diff::compare_workbooks(&book, &book, &id_key_config(), "old_book", "new_book")
            .expect("compare");

    assert!(!report.has_differences());
    assert_eq!(report.changed_sheets().count(), 0);
    build_report_workbook(&report).expect("an empty report still builds");
}

#[test]
fn changed_block_layout_includes_both_labels() {
    let report = changed_report();
    let changed = &report.sheets[0].diff.changed;
    assert_eq!(changed.old_label, "old_book");
    assert_eq!(changed.new_label, "new_book");
    assert_eq!(changed.keys, vec![num(1.0)]);
    assert_eq!(changed.columns[0].old, vec![text("a")]);
    assert_eq!(changed.columns[0].new, vec![text("changed")]);
}
