//! XML parsing for worksheet data.
//!
//! Handles the worksheet XML, shared strings, workbook structure, and
//! relationship parts of an `.xlsx` package, producing row-major cell data
//! the loader turns into [`crate::table::Table`]s.

use crate::table::Value;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SheetParseError {
    #[error("XML parse error: {0}")]
    XmlError(String),
    #[error("invalid cell address: {0}")]
    InvalidAddress(String),
    #[error("shared string index {0} out of bounds")]
    SharedStringOutOfBounds(usize),
}

/// A sheet entry of `workbook.xml`, before its data part is resolved.
pub struct SheetDescriptor {
    pub name: String,
    pub rel_id: Option<String>,
    pub sheet_id: Option<u32>,
}

/// Parse an A1-style address into zero-based `(row, col)`.
pub fn address_to_index(address: &str) -> Option<(u32, u32)> {
    let split = address.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = address.split_at(split);
    if letters.is_empty() || digits.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        col = col.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)?;
    }

    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, col - 1))
}

pub fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, SheetParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"si" => {
                current.clear();
                in_si = true;
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" && in_si => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| SheetParseError::XmlError(e.to_string()))?
                    .into_owned();
                current.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"si" => {
                strings.push(std::mem::take(&mut current));
                in_si = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SheetParseError::XmlError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

pub fn parse_workbook_xml(xml: &[u8]) -> Result<Vec<SheetDescriptor>, SheetParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rel_id = None;
                let mut sheet_id = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| SheetParseError::XmlError(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"name" => {
                            name = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        b"sheetId" => {
                            let parsed = attr.unescape_value().map_err(to_xml_err)?;
                            sheet_id = parsed.into_owned().parse::<u32>().ok();
                        }
                        b"r:id" => {
                            rel_id = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        _ => {}
                    }
                }
                if let Some(name) = name {
                    sheets.push(SheetDescriptor {
                        name,
                        rel_id,
                        sheet_id,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SheetParseError::XmlError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

pub fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, SheetParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut map = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut rel_type = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| SheetParseError::XmlError(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned()),
                        b"Target" => {
                            target = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        b"Type" => {
                            rel_type = Some(attr.unescape_value().map_err(to_xml_err)?.into_owned())
                        }
                        _ => {}
                    }
                }

                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type)
                    && rel_type.contains("worksheet")
                {
                    map.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SheetParseError::XmlError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(map)
}

/// The package path of a sheet's data part.
pub fn resolve_sheet_target(
    sheet: &SheetDescriptor,
    relationships: &HashMap<String, String>,
    index: usize,
) -> String {
    if let Some(rel_id) = &sheet.rel_id
        && let Some(target) = relationships.get(rel_id)
    {
        return normalize_target(target);
    }

    let guessed = sheet
        .sheet_id
        .map(|id| format!("xl/worksheets/sheet{id}.xml"))
        .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", index + 1));
    normalize_target(&guessed)
}

fn normalize_target(target: &str) -> String {
    let trimmed = target.trim_start_matches('/');
    if trimmed.starts_with("xl/") {
        trimmed.to_string()
    } else {
        format!("xl/{trimmed}")
    }
}

/// Parse a worksheet part into rectangular row-major values.
///
/// Rows and columns never mentioned in the XML come back as
/// [`Value::Blank`]; trailing fully-blank rows are not trimmed, since row
/// position can be the alignment key.
pub fn parse_sheet_xml(
    xml: &[u8],
    shared_strings: &[String],
) -> Result<Vec<Vec<Value>>, SheetParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut parsed_cells: Vec<ParsedCell> = Vec::new();
    let mut max_row: Option<u32> = None;
    let mut max_col: Option<u32> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"c" => {
                let cell = parse_cell(&mut reader, e, shared_strings)?;
                max_row = Some(max_row.map_or(cell.row, |r| r.max(cell.row)));
                max_col = Some(max_col.map_or(cell.col, |c| c.max(cell.col)));
                parsed_cells.push(cell);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SheetParseError::XmlError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let (Some(max_row), Some(max_col)) = (max_row, max_col) else {
        return Ok(Vec::new());
    };

    let mut rows =
        vec![vec![Value::Blank; max_col as usize + 1]; max_row as usize + 1];
    for cell in parsed_cells {
        rows[cell.row as usize][cell.col as usize] = cell.value;
    }

    Ok(rows)
}

fn parse_cell(
    reader: &mut Reader<&[u8]>,
    start: BytesStart,
    shared_strings: &[String],
) -> Result<ParsedCell, SheetParseError> {
    let address_raw = get_attr_value(&start, b"r")?
        .ok_or_else(|| SheetParseError::XmlError("cell missing address".into()))?;
    let (row, col) = address_to_index(&address_raw)
        .ok_or_else(|| SheetParseError::InvalidAddress(address_raw.clone()))?;

    let cell_type = get_attr_value(&start, b"t")?;

    let mut value_text: Option<String> = None;
    let mut inline_text: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"v" => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| SheetParseError::XmlError(e.to_string()))?
                    .into_owned();
                value_text = Some(text);
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"is" => {
                inline_text = Some(read_inline_string(reader)?);
            }
            Ok(Event::End(e)) if e.name().as_ref() == start.name().as_ref() => break,
            Ok(Event::Eof) => {
                return Err(SheetParseError::XmlError("unexpected EOF inside cell".into()));
            }
            Err(e) => return Err(SheetParseError::XmlError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let value = match inline_text {
        Some(text) => Value::Text(text),
        None => convert_value(value_text.as_deref(), cell_type.as_deref(), shared_strings)?,
    };

    Ok(ParsedCell { row, col, value })
}

fn read_inline_string(reader: &mut Reader<&[u8]>) -> Result<String, SheetParseError> {
    let mut buf = Vec::new();
    let mut value = String::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|e| SheetParseError::XmlError(e.to_string()))?
                    .into_owned();
                value.push_str(&text);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"is" => break,
            Ok(Event::Eof) => {
                return Err(SheetParseError::XmlError(
                    "unexpected EOF inside inline string".into(),
                ));
            }
            Err(e) => return Err(SheetParseError::XmlError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(value)
}

fn convert_value(
    value_text: Option<&str>,
    cell_type: Option<&str>,
    shared_strings: &[String],
) -> Result<Value, SheetParseError> {
    let raw = match value_text {
        Some(t) => t,
        None => return Ok(Value::Blank),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::text(""));
    }

    match cell_type {
        Some("s") => {
            let idx = trimmed
                .parse::<usize>()
                .map_err(|e| SheetParseError::XmlError(e.to_string()))?;
            let text = shared_strings
                .get(idx)
                .ok_or(SheetParseError::SharedStringOutOfBounds(idx))?;
            Ok(Value::text(text.clone()))
        }
        Some("b") => Ok(match trimmed {
            "1" => Value::Bool(true),
            "0" => Value::Bool(false),
            _ => Value::Blank,
        }),
        // Error cells (#DIV/0! etc.) carry their code as text.
        Some("e") => Ok(Value::text(trimmed)),
        Some("str") | Some("inlineStr") => Ok(Value::text(raw)),
        _ => {
            if let Ok(n) = trimmed.parse::<f64>() {
                Ok(Value::Number(n))
            } else {
                Ok(Value::text(trimmed))
            }
        }
    }
}

fn get_attr_value(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, SheetParseError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| SheetParseError::XmlError(e.to_string()))?;
        if attr.key.as_ref() == key {
            return Ok(Some(
                attr.unescape_value().map_err(to_xml_err)?.into_owned(),
            ));
        }
    }
    Ok(None)
}

fn to_xml_err(err: quick_xml::Error) -> SheetParseError {
    SheetParseError::XmlError(err.to_string())
}

struct ParsedCell {
    row: u32,
    col: u32,
    value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parsing_covers_multi_letter_columns() {
        assert_eq!(address_to_index("A1"), Some((0, 0)));
        assert_eq!(address_to_index("B2"), Some((1, 1)));
        assert_eq!(address_to_index("AA10"), Some((9, 26)));
        assert_eq!(address_to_index(""), None);
        assert_eq!(address_to_index("11"), None);
        assert_eq!(address_to_index("A0"), None);
    }

    #[test]
    fn shared_strings_rich_text_flattens_runs() {
        let xml = br#"<?xml version="1.0"?>
<sst>
  <si>
    <r><t>Hello</t></r>
    <r><t xml:space="preserve"> World</t></r>
  </si>
</sst>"#;
        let strings = parse_shared_strings(xml).expect("shared strings should parse");
        assert_eq!(strings, vec!["Hello World".to_string()]);
    }

    #[test]
    fn sheet_xml_fills_gaps_with_blanks() {
        let xml = br#"<?xml version="1.0"?>
<worksheet><sheetData>
  <row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1"><v>3.5</v></c></row>
  <row r="3"><c r="B3" t="b"><v>1</v></c></row>
</sheetData></worksheet>"#;
        let rows = parse_sheet_xml(xml, &["id".to_string()]).expect("sheet should parse");

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], Value::text("id"));
        assert_eq!(rows[0][1], Value::Blank);
        assert_eq!(rows[0][2], Value::Number(3.5));
        assert_eq!(rows[1], vec![Value::Blank, Value::Blank, Value::Blank]);
        assert_eq!(rows[2][1], Value::Bool(true));
    }

    #[test]
    fn empty_sheet_parses_to_no_rows() {
        let xml = br#"<worksheet><sheetData/></worksheet>"#;
        let rows = parse_sheet_xml(xml, &[]).expect("empty sheet should parse");
        assert!(rows.is_empty());
    }

    #[test]
    fn convert_value_bool_0_1_and_other() {
        let false_val = convert_value(Some("0"), Some("b"), &[]).expect("bool conversion");
        assert_eq!(false_val, Value::Bool(false));

        let true_val = convert_value(Some("1"), Some("b"), &[]).expect("bool conversion");
        assert_eq!(true_val, Value::Bool(true));

        let none_val = convert_value(Some("2"), Some("b"), &[]).expect("bool conversion");
        assert_eq!(none_val, Value::Blank);
    }

    #[test]
    fn convert_value_shared_string_index_out_of_bounds_errors() {
        let err = convert_value(Some("5"), Some("s"), &["only".to_string()])
            .expect_err("invalid shared string index should error");
        assert!(matches!(err, SheetParseError::SharedStringOutOfBounds(5)));
    }

    #[test]
    fn convert_value_error_cell_becomes_text() {
        let value = convert_value(Some("#DIV/0!"), Some("e"), &[]).expect("error cell converts");
        assert_eq!(value, Value::text("#DIV/0!"));
    }

    #[test]
    fn inline_string_preserved_verbatim() {
        let xml = br#"<is><t xml:space="preserve"> hello</t></is>"#;
        let mut reader = Reader::from_reader(xml.as_ref());
        reader.config_mut().trim_text(false);
        let value = read_inline_string(&mut reader).expect("inline string should parse");
        assert_eq!(value, " hello");
    }

    #[test]
    fn workbook_xml_lists_sheets_in_order() {
        let xml = br#"<workbook xmlns:r="http://x">
  <sheets>
    <sheet name="Prices" sheetId="1" r:id="rId1"/>
    <sheet name="Stock" sheetId="2" r:id="rId2"/>
  </sheets>
</workbook>"#;
        let sheets = parse_workbook_xml(xml).expect("workbook xml should parse");
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Prices", "Stock"]);
        assert_eq!(sheets[0].rel_id.as_deref(), Some("rId1"));
    }

    #[test]
    fn sheet_target_resolution_prefers_relationship() {
        let mut relationships = HashMap::new();
        relationships.insert("rId1".to_string(), "worksheets/custom.xml".to_string());
        let sheet = SheetDescriptor {
            name: "Prices".into(),
            rel_id: Some("rId1".into()),
            sheet_id: Some(9),
        };
        assert_eq!(
            resolve_sheet_target(&sheet, &relationships, 0),
            "xl/worksheets/custom.xml"
        );

        let unresolved = SheetDescriptor {
            name: "Stock".into(),
            rel_id: None,
            sheet_id: Some(2),
        };
        assert_eq!(
            resolve_sheet_target(&unresolved, &relationships, 5),
            "xl/worksheets/sheet2.xml"
        );
    }
}
