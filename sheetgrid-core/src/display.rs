//! Display text and CSS classes for grid cells
//!
//! The formatted string produced by the reader always wins; the raw value is
//! only coerced to text when no formatted string exists. Styling is reduced to
//! a handful of classes the view can hook into:
//!
//! - `sp-Cell` on every cell
//! - `sp-Cell-Number` for numbers (right-aligned by the view)
//! - `sp-Cell-Error` for error codes
//! - `sp-Cell-MergeDown` when a merged region continues below the cell

use crate::model::RowMetadata;
use crate::reader::{Cell, CellValue};

pub const CELL_CLASS: &str = "sp-Cell";
pub const NUMBER_CLASS: &str = "sp-Cell-Number";
pub const ERROR_CLASS: &str = "sp-Cell-Error";
pub const MERGE_DOWN_CLASS: &str = "sp-Cell-MergeDown";

/// Text to display for a cell
pub fn cell_text(cell: &Cell) -> String {
    match &cell.formatted {
        Some(formatted) => formatted.clone(),
        None => cell.value.raw_text(),
    }
}

/// Text to display for an optional cell; empty slots render as ""
pub fn slot_text(cell: Option<&Cell>) -> String {
    cell.map(cell_text).unwrap_or_default()
}

/// CSS classes for the cell in `column_id` of a row with the given metadata
pub fn cell_classes(cell: Option<&Cell>, metadata: &RowMetadata, column_id: &str) -> Vec<&'static str> {
    let mut classes = vec![CELL_CLASS];

    if metadata.column(column_id).is_some_and(|column| column.merge_down) {
        classes.push(MERGE_DOWN_CLASS);
    }

    if let Some(cell) = cell {
        match &cell.value {
            CellValue::Number(_) => classes.push(NUMBER_CLASS),
            CellValue::Error(_) => classes.push(ERROR_CLASS),
            CellValue::Text(_) | CellValue::Boolean(_) | CellValue::Date(_) | CellValue::Stub => {}
        }
    }

    classes
}
