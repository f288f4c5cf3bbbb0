//! Cell coordinates, ranges and spreadsheet-style column labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CellCoord {
    #[serde(rename = "r")]
    pub row: u32,
    #[serde(rename = "c")]
    pub col: u32,
}

impl CellCoord {
    pub const ORIGIN: CellCoord = CellCoord { row: 0, col: 0 };

    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to Excel-style reference (e.g., "A1")
    pub fn to_excel_ref(&self) -> String {
        format!("{}{}", column_label(self.col), self.row as u64 + 1)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_excel_ref())
    }
}

/// Inclusive rectangular range of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellRange {
    #[serde(rename = "s")]
    pub start: CellCoord,
    #[serde(rename = "e")]
    pub end: CellCoord,
}

impl CellRange {
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self { start, end }
    }

    /// Build a range from `(start_row, start_col, end_row, end_col)`
    pub fn from_bounds(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self {
            start: CellCoord::new(start_row, start_col),
            end: CellCoord::new(end_row, end_col),
        }
    }

    /// The single cell range at A1
    pub fn origin() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> u32 {
        self.end.row.saturating_sub(self.start.row) + 1
    }

    pub fn col_count(&self) -> u32 {
        self.end.col.saturating_sub(self.start.col) + 1
    }

    pub fn contains_row(&self, row: u32) -> bool {
        self.start.row <= row && row <= self.end.row
    }

    /// Parse "A1:C9" or a single reference "B3" (which spans one cell)
    pub fn decode(range: &str) -> Option<Self> {
        let mut parts = range.trim().split(':');
        let start = parse_cell_ref(parts.next()?)?;
        let end = match parts.next() {
            Some(part) => parse_cell_ref(part)?,
            None => start,
        };
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            start: CellCoord::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellCoord::new(start.row.max(end.row), start.col.max(end.col)),
        })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Parse a cell reference like "A1" or "$B$12" into a zero-based coordinate
pub fn parse_cell_ref(cell_ref: &str) -> Option<CellCoord> {
    let cell_ref = cell_ref.trim();
    let digits_at = cell_ref.find(|ch: char| ch.is_ascii_digit())?;
    let (letters, digits) = cell_ref.split_at(digits_at);

    let col = column_index(letters.trim_matches('$'))?;
    let row = digits.parse::<u32>().ok()?;
    if row == 0 {
        return None;
    }

    Some(CellCoord::new(row - 1, col))
}

/// Convert a zero-based column index to its label (0 -> A, 25 -> Z, 26 -> AA)
pub fn column_label(col: u32) -> String {
    let mut col = col as u64;
    let mut result = Vec::new();
    loop {
        result.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result.reverse();
    String::from_utf8_lossy(&result).into_owned()
}

/// Convert a column label back to its zero-based index ("AA" -> 26)
pub fn column_index(label: &str) -> Option<u32> {
    if label.is_empty() {
        return None;
    }

    let mut col = 0u32;
    for ch in label.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }

    Some(col - 1)
}
