//! Configuration for parsing, column configuration and CSV export

use crate::reader::ParseOptions;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main grid configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default)]
    pub grid: GridSection,
    #[serde(default)]
    pub csv: CsvSection,
    #[serde(default)]
    pub input: InputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSection {
    /// Header of the synthetic row-index column
    #[serde(default = "default_row_index_header")]
    pub row_index_header: String,
    /// Width applied to columns that declare none; left to the view when unset
    #[serde(default)]
    pub default_column_width: Option<f64>,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            row_index_header: default_row_index_header(),
            default_column_width: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvSection {
    /// Field separator used when exporting a sheet
    #[serde(default = "default_csv_delimiter")]
    pub delimiter: char,
}

impl Default for CsvSection {
    fn default() -> Self {
        Self {
            delimiter: default_csv_delimiter(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSection {
    /// Field separator for text content; sniffed from the first line when unset
    #[serde(default)]
    pub text_delimiter: Option<char>,
}

fn default_row_index_header() -> String {
    "#".to_string()
}

fn default_csv_delimiter() -> char {
    ','
}

impl GridConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GridConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.csv.delimiter.is_ascii() || matches!(self.csv.delimiter, '"' | '\n' | '\r') {
            anyhow::bail!(
                "Configuration error: csv.delimiter must be a single ASCII character other than a quote or newline, got {:?}",
                self.csv.delimiter
            );
        }
        if let Some(delimiter) = self.input.text_delimiter {
            if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
                anyhow::bail!(
                    "Configuration error: input.text_delimiter must be a single ASCII character other than a quote or newline, got {:?}",
                    delimiter
                );
            }
        }
        if let Some(width) = self.grid.default_column_width {
            if !(width.is_finite() && width > 0.0) {
                anyhow::bail!(
                    "Configuration error: grid.default_column_width must be a positive number, got {}",
                    width
                );
            }
        }
        Ok(())
    }

    pub fn csv_delimiter(&self) -> u8 {
        ascii_byte(self.csv.delimiter).unwrap_or(b',')
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            text_delimiter: self.input.text_delimiter.and_then(ascii_byte),
        }
    }
}

fn ascii_byte(ch: char) -> Option<u8> {
    u8::try_from(ch).ok().filter(u8::is_ascii)
}
