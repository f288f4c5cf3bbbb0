//! Column configuration for grid widgets

use crate::cell_ref::{CellRange, column_label};
use crate::config::GridConfig;
use crate::display;
use crate::reader::Sheet;
use serde::Serialize;

use super::row::{ROW_ID_FIELD, Row, field_name};

pub const ROW_INDEX_COLUMN_ID: &str = "row";
pub const ROW_INDEX_CLASS: &str = "sp-Row-Index";
pub const HEADER_CLASS: &str = "sp-GridHeader";

/// How a column renders its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnFormatter {
    /// One-based row number
    RowIndex,
    /// Display text of the cell in the column's field
    Cell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub id: String,
    pub name: String,
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
    pub header_css_class: String,
    pub formatter: ColumnFormatter,
}

impl ColumnConfig {
    fn row_index(header: &str) -> Self {
        Self {
            id: ROW_INDEX_COLUMN_ID.to_string(),
            name: header.to_string(),
            field: ROW_ID_FIELD.to_string(),
            width: None,
            css_class: Some(ROW_INDEX_CLASS.to_string()),
            header_css_class: HEADER_CLASS.to_string(),
            formatter: ColumnFormatter::RowIndex,
        }
    }

    fn data(col: u32, width: Option<f64>) -> Self {
        let field = field_name(col);
        Self {
            id: field.clone(),
            name: column_label(col),
            field,
            width,
            css_class: None,
            header_css_class: HEADER_CLASS.to_string(),
            formatter: ColumnFormatter::Cell,
        }
    }

    /// Text this column shows for `row`
    pub fn format(&self, row: &Row) -> String {
        match self.formatter {
            ColumnFormatter::RowIndex => (u64::from(row.id()) + 1).to_string(),
            ColumnFormatter::Cell => display::slot_text(row.get(&self.field)),
        }
    }
}

/// Row-index column followed by one column per extent column
pub fn build_columns(sheet: &Sheet, extent: CellRange, config: &GridConfig) -> Vec<ColumnConfig> {
    let mut columns = Vec::with_capacity(extent.col_count() as usize + 1);
    columns.push(ColumnConfig::row_index(&config.grid.row_index_header));
    columns.extend((extent.start.col..=extent.end.col).map(|col| {
        let width = sheet.column_width(col).or(config.grid.default_column_width);
        ColumnConfig::data(col, width)
    }));
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Cell;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_row_index_then_data_columns() {
        let mut sheet = Sheet::new("S");
        sheet.column_widths.insert(1, 20.5);

        let columns = build_columns(&sheet, CellRange::from_bounds(0, 0, 4, 2), &GridConfig::default());
        let ids: Vec<&str> = columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["row", "c0", "c1", "c2"]);

        let index = &columns[0];
        assert_eq!(index.name, "#");
        assert_eq!(index.field, "id");
        assert_eq!(index.css_class.as_deref(), Some(ROW_INDEX_CLASS));
        assert_eq!(index.formatter, ColumnFormatter::RowIndex);

        assert_eq!(columns[1].name, "A");
        assert_eq!(columns[1].width, None);
        assert_eq!(columns[2].width, Some(20.5));
        assert!(columns.iter().all(|c| c.header_css_class == HEADER_CLASS));
    }

    #[test]
    fn test_configured_header_and_default_width() {
        let config = GridConfig::from_toml("[grid]\nrow_index_header = \"Row\"\ndefault_column_width = 9.0\n").unwrap();
        let mut sheet = Sheet::new("S");
        sheet.column_widths.insert(0, 30.0);

        let columns = build_columns(&sheet, CellRange::from_bounds(0, 0, 0, 1), &config);
        assert_eq!(columns[0].name, "Row");
        assert_eq!(columns[1].width, Some(30.0));
        assert_eq!(columns[2].width, Some(9.0));
    }

    #[test]
    fn test_format_row() {
        let columns = build_columns(&Sheet::new("S"), CellRange::from_bounds(0, 0, 0, 1), &GridConfig::default());
        let row = Row::new(4, vec![Some(Cell::number(42.0)), None]);

        assert_eq!(columns[0].format(&row), "5");
        assert_eq!(columns[1].format(&row), "42");
        assert_eq!(columns[2].format(&row), "");
    }
}
