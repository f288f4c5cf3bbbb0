//! Workbook data structures

use crate::cell_ref::CellRange;
use crate::error::{ModelError, Result};
use crate::format::SpreadsheetFormat;
use std::collections::{BTreeMap, HashMap};

/// Represents a complete, parsed workbook.
///
/// Workbooks are never mutated once parsed; a content change produces a new one.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub format: SpreadsheetFormat,
    /// Sheets in declaration order
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get a sheet by name, failing when the workbook has no such sheet
    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.get_sheet(name)
            .ok_or_else(|| ModelError::SheetNotFound(name.to_string()))
    }

    /// Get all sheet names in declaration order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn first_sheet_name(&self) -> Option<&str> {
        self.sheets.first().map(|s| s.name.as_str())
    }
}

/// A merged cell region; the top-left cell is the anchor
pub type MergeRegion = CellRange;

/// Represents a worksheet
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub cells: HashMap<(u32, u32), Cell>,
    /// Declared bound of the sheet's cells (e.g. "B2:D10"); may not start at A1
    pub declared_range: Option<String>,
    pub merged_cells: Vec<MergeRegion>,
    /// Column width hints in character units, keyed by zero-based column
    pub column_widths: BTreeMap<u32, f64>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get a cell at the given position
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.cells.insert((row, col), cell);
    }

    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    /// Bounding range of the populated cells, or `None` for an empty sheet
    pub fn data_bounds(&self) -> Option<CellRange> {
        let mut keys = self.cells.keys();
        let &(first_row, first_col) = keys.next()?;
        let mut bounds = CellRange::from_bounds(first_row, first_col, first_row, first_col);
        for &(row, col) in keys {
            bounds.start.row = bounds.start.row.min(row);
            bounds.start.col = bounds.start.col.min(col);
            bounds.end.row = bounds.end.row.max(row);
            bounds.end.col = bounds.end.col.max(col);
        }
        Some(bounds)
    }
}

/// Represents a single cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    /// Pre-formatted display text; preferred over `value` when present
    pub formatted: Option<String>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            formatted: None,
        }
    }

    pub fn with_formatted(value: CellValue, formatted: impl Into<String>) -> Self {
        Self {
            value,
            formatted: Some(formatted.into()),
        }
    }

    pub fn number(value: f64) -> Self {
        Self::with_formatted(CellValue::Number(value), general_number(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::with_formatted(CellValue::Text(value.clone()), value)
    }

    pub fn boolean(value: bool) -> Self {
        Self::with_formatted(CellValue::Boolean(value), boolean_text(value))
    }

    pub fn error(code: impl Into<String>) -> Self {
        let code = code.into();
        Self::with_formatted(CellValue::Error(code.clone()), code)
    }
}

/// Cell value types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Error code such as `#DIV/0!`
    Error(String),
    Date(DateValue),
    /// Placeholder cell with no value (e.g. formatting only)
    Stub,
}

/// Raw representation of a date-like value
#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    /// Spreadsheet serial date number
    Serial(f64),
    /// ISO 8601 text, as stored by OpenDocument
    Iso(String),
}

impl CellValue {
    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Raw value coerced to text
    pub fn raw_text(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
            CellValue::Date(DateValue::Serial(n)) => n.to_string(),
            CellValue::Date(DateValue::Iso(s)) => s.clone(),
            CellValue::Stub => String::new(),
        }
    }
}

/// Format a number the way the "General" number format displays it
pub fn general_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }

    let text = format!("{value:.10}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

pub fn boolean_text(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}
