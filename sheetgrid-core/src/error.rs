//! Error types for parsing and model lookups

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Content is not a recognized spreadsheet container
    #[error("unrecognized spreadsheet content: {0}")]
    Parse(String),

    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to read archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to read workbook: {0}")]
    Calamine(#[from] calamine::Error),

    #[error("delimited text error: {0}")]
    Csv(#[from] csv::Error),

    /// A sheet was requested by name and the workbook has no such sheet
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ModelError {
    pub fn parse(message: impl Into<String>) -> Self {
        ModelError::Parse(message.into())
    }
}
