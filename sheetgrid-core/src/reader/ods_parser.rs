//! ODS parsing utilities for extracting sheet layout from OpenDocument archives

use super::SheetLayout;
use crate::cell_ref::CellRange;
use crate::error::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::BufReader;
use zip::ZipArchive;

/// Highest column index a worksheet can address
const MAX_COLUMN: u32 = 16_383;

/// Highest row index a worksheet can address
const MAX_ROW: u32 = 1_048_575;

/// Maximum digit width, in pixels, of the default font used for width conversion
const MAX_DIGIT_WIDTH: f64 = 7.0;

/// Extract merged cells and column widths of every table in `content.xml`.
///
/// ODS format:
/// - merges: `<table:table-cell table:number-columns-spanned="X" table:number-rows-spanned="Y">`
/// - widths: `<table:table-column table:style-name="co1">` pointing at an automatic
///   `table-column` style with a `style:column-width` length
pub fn extract_sheet_layouts_from_ods(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<HashMap<String, SheetLayout>> {
    let mut layouts = HashMap::new();

    // ODS stores all sheets in content.xml
    let content_xml = match archive.by_name("content.xml") {
        Ok(file) => file,
        Err(_) => return Ok(layouts),
    };

    let mut reader = Reader::from_reader(BufReader::new(content_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut column_styles: HashMap<String, f64> = HashMap::new();
    let mut current_style: Option<String> = None;

    let mut current_table: Option<(String, SheetLayout)> = None;
    let mut current_row = 0u32;
    let mut current_col = 0u32;
    let mut next_column = 0u32;
    let mut current_row_repeated = 1u32;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        let is_empty = matches!(event, Event::Empty(_));
        match event {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"style:style" => {
                    let family = attr_string(&e, b"style:family");
                    current_style = if family.as_deref() == Some("table-column") {
                        attr_string(&e, b"style:name")
                    } else {
                        None
                    };
                }
                b"style:table-column-properties" => {
                    if let Some(style) = &current_style {
                        if let Some(width) =
                            attr_string(&e, b"style:column-width").and_then(|w| length_to_char_width(&w))
                        {
                            column_styles.insert(style.clone(), width);
                        }
                    }
                }
                b"table:table" => {
                    if let Some((name, layout)) = current_table.take() {
                        layouts.insert(name, layout);
                    }
                    let name = attr_string(&e, b"table:name").unwrap_or_default();
                    current_table = Some((name, SheetLayout::default()));
                    current_row = 0;
                    current_col = 0;
                    next_column = 0;
                }
                b"table:table-column" => {
                    if let Some((_, layout)) = current_table.as_mut() {
                        let repeated = attr_u32(&e, b"table:number-columns-repeated").unwrap_or(1);
                        let width = attr_string(&e, b"table:style-name")
                            .and_then(|style| column_styles.get(&style).copied());
                        for _ in 0..repeated {
                            if next_column > MAX_COLUMN {
                                break;
                            }
                            if let Some(width) = width {
                                layout.column_widths.insert(next_column, width);
                            }
                            next_column += 1;
                        }
                    }
                }
                b"table:table-row" if current_table.is_some() => {
                    current_col = 0;
                    current_row_repeated = attr_u32(&e, b"table:number-rows-repeated").unwrap_or(1);
                    if is_empty {
                        current_row = current_row.saturating_add(current_row_repeated);
                    }
                }
                b"table:table-cell" | b"table:covered-table-cell" => {
                    if let Some((_, layout)) = current_table.as_mut() {
                        let cols_spanned = attr_u32(&e, b"table:number-columns-spanned").unwrap_or(1);
                        let rows_spanned = attr_u32(&e, b"table:number-rows-spanned").unwrap_or(1);
                        let repeated = attr_u32(&e, b"table:number-columns-repeated").unwrap_or(1);

                        // If either span is > 1, this is a merged cell
                        let in_bounds = current_row <= MAX_ROW && current_col <= MAX_COLUMN;
                        if in_bounds && (cols_spanned > 1 || rows_spanned > 1) {
                            layout.merged_cells.push(CellRange::from_bounds(
                                current_row,
                                current_col,
                                current_row.saturating_add(rows_spanned - 1).min(MAX_ROW),
                                current_col.saturating_add(cols_spanned - 1).min(MAX_COLUMN),
                            ));
                        }

                        current_col = current_col.saturating_add(repeated);
                    }
                }
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"style:style" => current_style = None,
                b"table:table-row" if current_table.is_some() => {
                    current_row = current_row.saturating_add(current_row_repeated);
                }
                b"table:table" => {
                    if let Some((name, layout)) = current_table.take() {
                        layouts.insert(name, layout);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(layouts)
}

fn attr_string(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| attr.unescape_value().unwrap_or_default().into_owned())
}

fn attr_u32(e: &BytesStart<'_>, key: &[u8]) -> Option<u32> {
    attr_string(e, key).and_then(|value| value.parse::<u32>().ok())
        .filter(|&value| value > 0)
}

/// Convert an ODF length ("0.889in", "2.258cm", "64pt") into a character width,
/// the unit XLSX uses for `<col width>`.
fn length_to_char_width(length: &str) -> Option<f64> {
    let length = length.trim();
    let unit_at = length.find(|ch: char| ch.is_ascii_alphabetic())?;
    let (number, unit) = length.split_at(unit_at);
    let number = number.parse::<f64>().ok()?;

    let points = match unit {
        "in" => number * 72.0,
        "cm" => number * 72.0 / 2.54,
        "mm" => number * 72.0 / 25.4,
        "pt" => number,
        "pc" => number * 12.0,
        "px" => number * 0.75,
        _ => return None,
    };

    let pixels = points * 96.0 / 72.0;
    Some(((pixels - 5.0) / MAX_DIGIT_WIDTH * 100.0 + 0.5).floor() / 100.0)
}
