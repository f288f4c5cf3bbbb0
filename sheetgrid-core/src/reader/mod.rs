//! Spreadsheet reader: raw document content to an immutable [`Workbook`]
//!
//! Cell values are read with calamine. For XLSX and ODS the archive is opened
//! a second time and walked with quick-xml to recover layout information
//! (declared dimension, merged cells, column widths).

use crate::cell_ref::CellRange;
use crate::error::{ModelError, Result};
use crate::format::SpreadsheetFormat;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use calamine::{Data, Reader, Sheets, open_workbook_auto_from_rs};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::sync::OnceLock;
use zip::ZipArchive;

pub mod delimited;
pub mod ods_parser;
pub mod workbook;
pub mod xml_parser;

pub use workbook::{Cell, CellValue, DateValue, MergeRegion, Sheet, Workbook};

/// One full snapshot of a document's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Raw file bytes
    Binary(Vec<u8>),
    /// Base64-encoded file bytes, optionally as a `data:` URL
    Base64(String),
    /// Delimited text. A `data:...;base64,` URL is decoded as [`Content::Base64`];
    /// bare base64 is not detected and reads as text.
    Text(String),
}

impl Content {
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Content::Binary(bytes.into())
    }

    pub fn base64(encoded: impl Into<String>) -> Self {
        Content::Base64(encoded.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(text.into())
    }
}

/// Options that influence how content is parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Field delimiter for delimited text; sniffed when `None`
    pub text_delimiter: Option<u8>,
}

/// Layout information recovered from the raw container XML
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetLayout {
    pub declared_range: Option<String>,
    pub merged_cells: Vec<MergeRegion>,
    pub column_widths: BTreeMap<u32, f64>,
}

/// Parse document content into a workbook
pub fn parse(content: &Content) -> Result<Workbook> {
    parse_with_options(content, &ParseOptions::default())
}

pub fn parse_with_options(content: &Content, options: &ParseOptions) -> Result<Workbook> {
    match content {
        Content::Binary(bytes) => parse_bytes(bytes, options),
        Content::Base64(encoded) => parse_bytes(&decode_base64(encoded)?, options),
        Content::Text(text) if data_url_pattern().is_match(text.trim_start()) => {
            parse_bytes(&decode_base64(text)?, options)
        }
        Content::Text(text) => delimited::parse_delimited(text, options.text_delimiter),
    }
}

/// Decode base64 content, dropping a leading `data:<mime>;base64,` URL prefix
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    let payload = data_url_pattern().replace(encoded.trim(), "");
    let payload: String = payload.chars().filter(|ch| !ch.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(payload)?)
}

fn data_url_pattern() -> &'static Regex {
    static DATA_URL: OnceLock<Regex> = OnceLock::new();
    DATA_URL.get_or_init(|| {
        Regex::new(r"^data:[^;,]*;base64,").expect("data URL pattern is a valid regex")
    })
}

fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> Result<Workbook> {
    if bytes.is_empty() {
        return Err(ModelError::parse("content is empty"));
    }

    let format = SpreadsheetFormat::sniff(bytes)
        .ok_or_else(|| ModelError::parse("content is not a spreadsheet container or UTF-8 text"))?;

    if format.is_delimited() {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ModelError::parse(format!("delimited text is not UTF-8: {e}")))?;
        return delimited::parse_delimited(text, options.text_delimiter);
    }

    read_container(bytes, format)
}

fn read_container(bytes: &[u8], format: SpreadsheetFormat) -> Result<Workbook> {
    let mut excel = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let mut layouts = read_layouts(bytes, format);

    let sheet_names = excel.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        let range = excel.worksheet_range(&sheet_name)?;
        let mut sheet = Sheet::new(sheet_name.clone());

        // calamine yields coordinates relative to the range start
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row, col, data) in range.used_cells() {
            let (Ok(row), Ok(col)) = (u32::try_from(row), u32::try_from(col)) else {
                continue;
            };
            if let Some(cell) = convert_cell(data) {
                sheet.set_cell(start_row + row, start_col + col, cell);
            }
        }

        if let Sheets::Xls(xls) = &excel {
            if let Some(merges) = xls.worksheet_merge_cells(&sheet_name) {
                sheet.merged_cells = merges
                    .iter()
                    .map(|dim| CellRange::from_bounds(dim.start.0, dim.start.1, dim.end.0, dim.end.1))
                    .collect();
            }
        }

        if let Some(layout) = layouts.remove(&sheet_name) {
            sheet.declared_range = layout.declared_range;
            sheet.merged_cells.extend(layout.merged_cells);
            sheet.column_widths = layout.column_widths;
        }
        if sheet.declared_range.is_none() {
            sheet.declared_range = sheet.data_bounds().map(|bounds| bounds.to_string());
        }

        sheets.push(sheet);
    }

    log::debug!("parsed {format} workbook with {} sheet(s)", sheets.len());

    Ok(Workbook { format, sheets })
}

/// Layout extraction is best-effort: a failure only loses widths and merges
fn read_layouts(bytes: &[u8], format: SpreadsheetFormat) -> HashMap<String, SheetLayout> {
    let result = match format {
        SpreadsheetFormat::Xlsx => read_xlsx_layouts(bytes),
        SpreadsheetFormat::Ods => ZipArchive::new(Cursor::new(bytes))
            .map_err(ModelError::from)
            .and_then(|mut archive| ods_parser::extract_sheet_layouts_from_ods(&mut archive)),
        _ => Ok(HashMap::new()),
    };

    result.unwrap_or_else(|e| {
        log::warn!("skipping {format} layout extraction: {e}");
        HashMap::new()
    })
}

fn read_xlsx_layouts(bytes: &[u8]) -> Result<HashMap<String, SheetLayout>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut layouts = HashMap::new();

    for (name, path) in xml_parser::read_sheet_paths(&mut archive)? {
        match xml_parser::extract_sheet_layout_from_xlsx(&mut archive, &path) {
            Ok(layout) => {
                layouts.insert(name, layout);
            }
            Err(e) => log::warn!("skipping layout of sheet '{name}' ({path}): {e}"),
        }
    }

    Ok(layouts)
}

/// Convert a calamine cell into a typed cell with its display text
fn convert_cell(data: &Data) -> Option<Cell> {
    let cell = match data {
        Data::Empty => return None,
        Data::Int(i) => Cell::with_formatted(CellValue::Number(*i as f64), i.to_string()),
        Data::Float(f) => Cell::number(*f),
        Data::String(s) => Cell::text(s.clone()),
        Data::Bool(b) => Cell::boolean(*b),
        Data::Error(e) => Cell::error(e.to_string()),
        Data::DateTime(dt) if dt.is_duration() => Cell::number(dt.as_f64()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            let value = CellValue::Date(DateValue::Serial(serial));
            match dt.as_datetime() {
                Some(datetime) if serial.fract() == 0.0 => {
                    Cell::with_formatted(value, datetime.format("%Y-%m-%d").to_string())
                }
                Some(datetime) => {
                    Cell::with_formatted(value, datetime.format("%Y-%m-%d %H:%M:%S").to_string())
                }
                None => Cell::new(value),
            }
        }
        Data::DateTimeIso(s) => {
            Cell::with_formatted(CellValue::Date(DateValue::Iso(s.clone())), s.replacen('T', " ", 1))
        }
        Data::DurationIso(s) => Cell::text(s.clone()),
    };
    Some(cell)
}
