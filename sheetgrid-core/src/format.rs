//! Spreadsheet container formats, their mimetypes, and content sniffing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use zip::ZipArchive;

/// Mimetype for old-style (pre-2007) binary Excel workbooks (`.xls`)
pub const XLS_MIMETYPE: &str = "application/vnd.ms-excel";

/// Mimetype for XML-based Excel workbooks (`.xlsx`, `.xlsm`)
pub const XLSX_MIMETYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Mimetype for binary Excel 2007+ workbooks (`.xlsb`)
pub const XLSB_MIMETYPE: &str = "application/vnd.ms-excel.sheet.binary.macroEnabled.12";

/// Mimetype for OpenOffice and LibreOffice spreadsheets (`.ods`)
pub const ODS_MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

pub const CSV_MIMETYPE: &str = "text/csv";

pub const TSV_MIMETYPE: &str = "text/tab-separated-values";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadsheetFormat {
    Xls,
    Xlsx,
    Xlsb,
    Ods,
    Csv,
    Tsv,
}

impl SpreadsheetFormat {
    pub const ALL: [SpreadsheetFormat; 6] = [
        SpreadsheetFormat::Xls,
        SpreadsheetFormat::Xlsx,
        SpreadsheetFormat::Xlsb,
        SpreadsheetFormat::Ods,
        SpreadsheetFormat::Csv,
        SpreadsheetFormat::Tsv,
    ];

    pub fn mimetype(self) -> &'static str {
        match self {
            SpreadsheetFormat::Xls => XLS_MIMETYPE,
            SpreadsheetFormat::Xlsx => XLSX_MIMETYPE,
            SpreadsheetFormat::Xlsb => XLSB_MIMETYPE,
            SpreadsheetFormat::Ods => ODS_MIMETYPE,
            SpreadsheetFormat::Csv => CSV_MIMETYPE,
            SpreadsheetFormat::Tsv => TSV_MIMETYPE,
        }
    }

    /// File extensions associated with the format, without the leading dot
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            SpreadsheetFormat::Xls => &["xls"],
            SpreadsheetFormat::Xlsx => &["xlsx", "xlsm"],
            SpreadsheetFormat::Xlsb => &["xlsb"],
            SpreadsheetFormat::Ods => &["ods"],
            SpreadsheetFormat::Csv => &["csv"],
            SpreadsheetFormat::Tsv => &["tsv", "tab"],
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.');
        Self::ALL.into_iter().find(|format| {
            format
                .extensions()
                .iter()
                .any(|ext| ext.eq_ignore_ascii_case(extension))
        })
    }

    pub fn from_mimetype(mimetype: &str) -> Option<Self> {
        let essence = mimetype.split(';').next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|format| format.mimetype().eq_ignore_ascii_case(essence))
    }

    /// Whether the format is delimited text rather than a workbook container
    pub fn is_delimited(self) -> bool {
        matches!(self, SpreadsheetFormat::Csv | SpreadsheetFormat::Tsv)
    }

    /// Identify the container format from its leading bytes.
    ///
    /// ZIP containers are told apart by their entries: ODS packages carry a
    /// `mimetype` entry, OOXML packages an `xl/workbook.*` part. Anything that
    /// is not a known container but decodes as UTF-8 is treated as delimited
    /// text, tab-separated when the first line has more tabs than commas.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(OLE_MAGIC) {
            return Some(SpreadsheetFormat::Xls);
        }
        if bytes.starts_with(ZIP_MAGIC) {
            return sniff_zip(bytes);
        }

        let text = std::str::from_utf8(bytes).ok()?;
        Some(sniff_delimited(text))
    }
}

impl fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpreadsheetFormat::Xls => "XLS",
            SpreadsheetFormat::Xlsx => "XLSX",
            SpreadsheetFormat::Xlsb => "XLSB",
            SpreadsheetFormat::Ods => "ODS",
            SpreadsheetFormat::Csv => "CSV",
            SpreadsheetFormat::Tsv => "TSV",
        };
        f.write_str(name)
    }
}

fn sniff_zip(bytes: &[u8]) -> Option<SpreadsheetFormat> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).ok()?;

    if let Ok(mut entry) = archive.by_name("mimetype") {
        let mut mimetype = String::new();
        if std::io::Read::read_to_string(&mut entry, &mut mimetype).is_ok()
            && mimetype.trim() == ODS_MIMETYPE
        {
            return Some(SpreadsheetFormat::Ods);
        }
    }

    if archive.by_name("xl/workbook.xml").is_ok() {
        return Some(SpreadsheetFormat::Xlsx);
    }
    if archive.by_name("xl/workbook.bin").is_ok() {
        return Some(SpreadsheetFormat::Xlsb);
    }
    if archive.by_name("content.xml").is_ok() {
        return Some(SpreadsheetFormat::Ods);
    }

    None
}

/// Pick CSV or TSV by comparing delimiter counts on the first line
pub fn sniff_delimited(text: &str) -> SpreadsheetFormat {
    let first_line = text.lines().next().unwrap_or_default();
    let tabs = first_line.matches('\t').count();
    let commas = first_line.matches(',').count();
    if tabs > commas {
        SpreadsheetFormat::Tsv
    } else {
        SpreadsheetFormat::Csv
    }
}
