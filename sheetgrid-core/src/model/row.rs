//! Dense row snapshots materialized from a sparse sheet

use crate::cell_ref::CellRange;
use crate::reader::{Cell, CellValue, DateValue, Sheet};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Field holding the row index in a row record
pub const ROW_ID_FIELD: &str = "id";

/// Field name for a zero-based data column ("c0", "c1", ...)
pub fn field_name(col: u32) -> String {
    format!("c{col}")
}

/// Column index named by a data field, if `field` is one
pub fn field_column(field: &str) -> Option<u32> {
    let digits = field.strip_prefix('c')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// One row of the active sheet, with a slot for every extent column.
///
/// Rows are owned snapshots: each query builds a fresh one, so callers can
/// keep or modify them without affecting the workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: u32,
    cells: Vec<Option<Cell>>,
}

impl Row {
    pub fn new(id: u32, cells: Vec<Option<Cell>>) -> Self {
        Self { id, cells }
    }

    /// A row with no data fields
    pub fn empty(id: u32) -> Self {
        Self::new(id, Vec::new())
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of data fields (the row id is not counted)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Option<Cell>] {
        &self.cells
    }

    /// Cell in data column `col`; `None` for empty slots and unknown columns
    pub fn cell(&self, col: u32) -> Option<&Cell> {
        self.cells.get(col as usize)?.as_ref()
    }

    /// Cell stored under a data field name such as "c2"
    pub fn get(&self, field: &str) -> Option<&Cell> {
        self.cell(field_column(field)?)
    }

    /// Whether the row has a slot (possibly empty) named `field`
    pub fn has_field(&self, field: &str) -> bool {
        field == ROW_ID_FIELD
            || field_column(field).is_some_and(|col| (col as usize) < self.cells.len())
    }

    /// Data fields in column order
    pub fn fields(&self) -> impl Iterator<Item = (String, Option<&Cell>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(col, cell)| (field_name(col as u32), cell.as_ref()))
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len() + 1))?;
        map.serialize_entry(ROW_ID_FIELD, &self.id)?;
        for (field, cell) in self.fields() {
            map.serialize_entry(&field, &cell.map(|cell| RawValue(&cell.value)))?;
        }
        map.end()
    }
}

/// Serializes a cell value as its plain JSON counterpart
struct RawValue<'a>(&'a CellValue);

impl Serialize for RawValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Text(s) | CellValue::Error(s) => serializer.serialize_str(s),
            CellValue::Boolean(b) => serializer.serialize_bool(*b),
            CellValue::Date(DateValue::Serial(n)) => serializer.serialize_f64(*n),
            CellValue::Date(DateValue::Iso(s)) => serializer.serialize_str(s),
            CellValue::Stub => serializer.serialize_none(),
        }
    }
}

/// Build the dense record for `index` within `extent`.
///
/// Indices past the extent produce a row of the same shape whose slots are all
/// empty.
pub fn materialize_row(sheet: &Sheet, extent: CellRange, index: u32) -> Row {
    let cells = (extent.start.col..=extent.end.col)
        .map(|col| sheet.get_cell(index, col).cloned())
        .collect();
    log::trace!("materialized row {index} of sheet '{}'", sheet.name);
    Row::new(index, cells)
}
