//! CSV/TSV parser that produces a single-sheet workbook

use super::workbook::{Cell, Sheet, Workbook};
use crate::error::Result;
use crate::format::{SpreadsheetFormat, sniff_delimited};

/// Name given to the only sheet of a delimited-text workbook
pub const DELIMITED_SHEET_NAME: &str = "Sheet1";

/// Parse delimited text. With no explicit delimiter, tab or comma is sniffed
/// from the first line.
pub fn parse_delimited(text: &str, delimiter: Option<u8>) -> Result<Workbook> {
    let (format, delimiter) = match delimiter {
        Some(b'\t') => (SpreadsheetFormat::Tsv, b'\t'),
        Some(delimiter) => (SpreadsheetFormat::Csv, delimiter),
        None => match sniff_delimited(text) {
            SpreadsheetFormat::Tsv => (SpreadsheetFormat::Tsv, b'\t'),
            _ => (SpreadsheetFormat::Csv, b','),
        },
    };

    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    // The reader drops blank lines, which still occupy a row of the sheet
    let rows = record_rows(text);
    let mut next_row = 0u32;

    let mut sheet = Sheet::new(DELIMITED_SHEET_NAME);
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = rows.get(index).copied().unwrap_or(next_row);
        next_row = row.saturating_add(1);
        for (col, field) in record.iter().enumerate() {
            let Ok(col) = u32::try_from(col) else {
                break;
            };
            if let Some(cell) = parse_field(field) {
                sheet.set_cell(row, col, cell);
            }
        }
    }

    sheet.declared_range = sheet.data_bounds().map(|bounds| bounds.to_string());

    Ok(Workbook {
        format,
        sheets: vec![sheet],
    })
}

/// Row index of every non-blank line of `text`, in order.
///
/// Line breaks inside quoted fields do not end a line. `\n`, `\r\n` and a
/// lone `\r` all terminate a line.
fn record_rows(text: &str) -> Vec<u32> {
    let bytes = text.as_bytes();
    let mut rows = Vec::new();
    let mut row = 0u32;
    let mut in_quotes = false;
    let mut has_content = false;

    for (i, &byte) in bytes.iter().enumerate() {
        let line_end = match byte {
            b'"' => {
                in_quotes = !in_quotes;
                false
            }
            b'\n' => !in_quotes,
            b'\r' => !in_quotes && bytes.get(i + 1) != Some(&b'\n'),
            _ => false,
        };
        if line_end {
            if has_content {
                rows.push(row);
            }
            row = row.saturating_add(1);
            has_content = false;
        } else if byte != b'\r' || in_quotes {
            has_content = true;
        }
    }
    if has_content {
        rows.push(row);
    }
    rows
}

/// Detect numbers and booleans; everything else non-empty is text
fn parse_field(field: &str) -> Option<Cell> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(number) = trimmed.parse::<f64>() {
        if number.is_finite() {
            return Some(Cell::number(number));
        }
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Some(Cell::boolean(true));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Some(Cell::boolean(false));
    }

    Some(Cell::text(field))
}
