//! Sheet extents, always anchored at A1

use crate::cell_ref::{CellCoord, CellRange};
use crate::reader::Sheet;

/// Extent of a sheet from A1 to the bottom-right corner of its declared range.
///
/// The declared range only bounds populated cells and may start past A1 when
/// leading rows or columns are empty; the start is forced back to the origin
/// so that rendered row and column indices match the sheet's own. A sheet with
/// no (or an unreadable) declared range is treated as empty: `A1:A1`.
pub fn sheet_extent(sheet: &Sheet) -> CellRange {
    let declared = sheet
        .declared_range
        .as_deref()
        .and_then(CellRange::decode)
        .unwrap_or_else(CellRange::origin);

    CellRange::new(CellCoord::ORIGIN, declared.end)
}
