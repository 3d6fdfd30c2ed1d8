//! XLSX sheet/row/cell walker over the workbook's XML parts.
//!
//! Cells are placed by their `r` reference, so gaps left by empty cells or
//! rows come back as empty strings.

use docsift_core::{DocError, DocResult, QaPair, SheetTable};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::ooxml::{self, attr, relationship_id, xml_error};

/// Largest row number a worksheet may hold.
const MAX_ROWS: usize = 1_048_576;
/// Largest column number a worksheet may hold (`XFD`).
const MAX_COLUMNS: usize = 16_384;

/// Read every sheet of a workbook, header rows included.
pub fn read_tables(content: &[u8]) -> DocResult<Vec<SheetTable>> {
    let mut package = ooxml::open(content)?;

    let workbook = ooxml::require_part(&mut package, "xl/workbook.xml")?;
    let rels = match ooxml::read_part(&mut package, "xl/_rels/workbook.xml.rels")? {
        Some(xml) => ooxml::relationships(&xml, "xl/")?,
        None => Default::default(),
    };
    let shared = match ooxml::read_part(&mut package, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let mut tables = Vec::new();
    for (position, (name, rel_id)) in parse_sheet_list(&workbook)?.into_iter().enumerate() {
        let part = rel_id
            .and_then(|id| rels.get(&id).cloned())
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", position + 1));
        let xml = ooxml::require_part(&mut package, &part)?;
        tables.push(SheetTable {
            name,
            rows: parse_sheet(&xml, &shared)?,
        });
    }

    Ok(tables)
}

/// Flatten a workbook into question/answer pairs.
///
/// The first row of every sheet is a header and is skipped; the first two
/// cells of each later row become the question and the answer. Fully blank
/// rows are dropped.
pub fn read_pairs(content: &[u8]) -> DocResult<Vec<QaPair>> {
    Ok(pairs_from_tables(&read_tables(content)?))
}

pub(crate) fn pairs_from_tables(tables: &[SheetTable]) -> Vec<QaPair> {
    tables
        .iter()
        .flat_map(|table| table.rows.iter().skip(1))
        .filter_map(|row| {
            let question = row.first().cloned().unwrap_or_default();
            let answer = row.get(1).cloned().unwrap_or_default();
            if question.is_empty() && answer.is_empty() {
                None
            } else {
                Some(QaPair { question, answer })
            }
        })
        .collect()
}

/// Sheet names with their relationship ids, in workbook order.
fn parse_sheet_list(xml: &str) -> DocResult<Vec<(String, Option<String>)>> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let name = attr(&e, b"name")?.unwrap_or_default();
                sheets.push((name, relationship_id(&e)?));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sheets)
}

fn parse_shared_strings(xml: &str) -> DocResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    // Phonetic runs (<rPh>) repeat the reading of the string; skip them.
    let mut in_phonetic = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text && !in_phonetic => {
                current.push_str(&t.unescape().map_err(xml_error)?);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

fn parse_sheet(xml: &str, shared: &[String]) -> DocResult<Vec<Vec<String>>> {
    let mut reader = Reader::from_str(xml);
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();

    let mut column = 0usize;
    let mut cell_type: Option<String> = None;
    let mut value = String::new();
    let mut in_value = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    let index = row_index(attr(&e, b"r")?.as_deref(), rows.len())?;
                    pad_rows(&mut rows, index);
                    row.clear();
                }
                b"c" => {
                    column = match attr(&e, b"r")? {
                        Some(reference) => column_index(&reference)?,
                        None => None,
                    }
                    .unwrap_or(row.len());
                    if column >= MAX_COLUMNS {
                        return Err(DocError::parse(format!(
                            "Cell column {} exceeds the sheet limit of {}",
                            column + 1,
                            MAX_COLUMNS
                        )));
                    }
                    cell_type = attr(&e, b"t")?;
                    value.clear();
                }
                b"v" | b"t" => in_value = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                let index = row_index(attr(&e, b"r")?.as_deref(), rows.len())?;
                pad_rows(&mut rows, index);
                rows.push(Vec::new());
            }
            Event::Text(t) if in_value => value.push_str(&t.unescape().map_err(xml_error)?),
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    let text = cell_text(cell_type.as_deref(), &value, shared)?;
                    if row.len() <= column {
                        row.resize(column + 1, String::new());
                    }
                    row[column] = text;
                }
                b"row" => rows.push(std::mem::take(&mut row)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rows)
}

fn cell_text(cell_type: Option<&str>, value: &str, shared: &[String]) -> DocResult<String> {
    match cell_type {
        Some("s") => {
            let index: usize = value
                .trim()
                .parse()
                .map_err(|_| DocError::parse(format!("Invalid shared string index: {}", value)))?;
            shared
                .get(index)
                .cloned()
                .ok_or_else(|| DocError::parse(format!("Shared string {} out of range", index)))
        }
        Some("b") => Ok(if value.trim() == "1" { "TRUE" } else { "FALSE" }.to_string()),
        _ => Ok(value.to_string()),
    }
}

/// Zero-based row index from an `r` attribute, defaulting to the next row.
fn row_index(reference: Option<&str>, next: usize) -> DocResult<usize> {
    let index = match reference {
        Some(r) => r
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(|| DocError::parse(format!("Invalid row reference: {}", r)))?,
        None => next,
    };
    if index >= MAX_ROWS {
        return Err(DocError::parse(format!(
            "Row {} exceeds the sheet limit of {}",
            index + 1,
            MAX_ROWS
        )));
    }
    Ok(index)
}

/// Insert blank rows until `rows.len() == index`.
fn pad_rows(rows: &mut Vec<Vec<String>>, index: usize) {
    while rows.len() < index {
        rows.push(Vec::new());
    }
}

/// Zero-based column index from a cell reference such as `AB12`.
///
/// `Ok(None)` when the reference carries no column letters.
fn column_index(reference: &str) -> DocResult<Option<usize>> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return Ok(None);
    }
    letters
        .iter()
        .try_fold(0usize, |acc, b| {
            acc.checked_mul(26)?.checked_add((b - b'A' + 1) as usize)
        })
        .filter(|n| *n <= MAX_COLUMNS)
        .map(|n| Some(n - 1))
        .ok_or_else(|| DocError::parse(format!("Cell reference out of range: {}", reference)))
}
