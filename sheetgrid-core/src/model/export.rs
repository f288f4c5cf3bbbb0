//! Delimited-text export of a single sheet

use crate::display;
use crate::error::{ModelError, Result};
use crate::reader::Sheet;

use super::extent::sheet_extent;
use super::row::materialize_row;

/// Serialize every row of the sheet's extent as delimited text.
///
/// Cells are written with their display text. Fields are quoted only when they
/// contain the delimiter, a quote or a line break; records end with `\n`.
pub fn sheet_to_csv(sheet: &Sheet, delimiter: u8) -> Result<String> {
    let extent = sheet_extent(sheet);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    for index in extent.start.row..=extent.end.row {
        let row = materialize_row(sheet, extent, index);
        writer.write_record(row.cells().iter().map(|cell| display::slot_text(cell.as_ref())))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ModelError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| ModelError::parse(format!("CSV output is not UTF-8: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Cell;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quotes_only_when_needed() {
        let mut sheet = Sheet::new("S");
        sheet.declared_range = Some("A1:C2".to_string());
        sheet.set_cell(0, 0, Cell::text("plain"));
        sheet.set_cell(0, 1, Cell::text("a,b"));
        sheet.set_cell(0, 2, Cell::text("say \"hi\""));
        sheet.set_cell(1, 0, Cell::number(1.5));
        sheet.set_cell(1, 2, Cell::text("two\nlines"));

        assert_eq!(
            sheet_to_csv(&sheet, b',').unwrap(),
            "plain,\"a,b\",\"say \"\"hi\"\"\"\n1.5,,\"two\nlines\"\n"
        );
    }

    #[test]
    fn test_leading_empty_rows_are_kept() {
        let mut sheet = Sheet::new("S");
        sheet.declared_range = Some("B2:B2".to_string());
        sheet.set_cell(1, 1, Cell::boolean(false));

        assert_eq!(sheet_to_csv(&sheet, b';').unwrap(), ";\n;FALSE\n");
    }
}
