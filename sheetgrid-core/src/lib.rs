//! sheetgrid-core: spreadsheet data model for virtualized grid views
//!
//! This library parses Excel, ODS and delimited-text documents into an
//! immutable workbook and exposes a pull-based data-provider contract
//! (row count, rows, row metadata, column configuration) for grid widgets,
//! together with change notifications when the document is reloaded or the
//! active sheet changes.

pub mod cell_ref;
pub mod config;
pub mod display;
pub mod error;
pub mod format;
pub mod model;
pub mod reader;
pub mod signal;
pub mod source;

pub use cell_ref::{CellCoord, CellRange, column_index, column_label};
pub use config::GridConfig;
pub use error::{ModelError, Result};
pub use format::SpreadsheetFormat;
pub use model::{ColumnConfig, ColumnFormatter, ColumnMetadata, Row, RowMetadata, SpreadsheetModel};
pub use reader::{Cell, CellValue, Content, DateValue, MergeRegion, Sheet, Workbook, parse};
pub use signal::{Signal, Subscription};
pub use source::ContentSource;
