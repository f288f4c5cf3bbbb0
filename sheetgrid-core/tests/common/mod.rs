#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// One worksheet of a mock XLSX file
pub struct MockSheet<'a> {
    pub name: &'a str,
    pub dimension: Option<&'a str>,
    /// (cell reference, value); numeric-looking values are written as numbers
    pub cells: &'a [(&'a str, &'a str)],
    pub merges: &'a [&'a str],
    /// (first column, last column, width), one-based like the XML
    pub cols: &'a [(u32, u32, f64)],
}

impl<'a> MockSheet<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            dimension: None,
            cells: &[],
            merges: &[],
            cols: &[],
        }
    }
}

fn row_of(cell_ref: &str) -> u32 {
    cell_ref
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .unwrap()
}

fn sheet_xml(sheet: &MockSheet<'_>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
"#,
    );
    if let Some(dimension) = sheet.dimension {
        xml.push_str(&format!(r#"<dimension ref="{dimension}"/>"#));
    }
    if !sheet.cols.is_empty() {
        xml.push_str("<cols>");
        for (min, max, width) in sheet.cols {
            xml.push_str(&format!(
                r#"<col min="{min}" max="{max}" width="{width}" customWidth="1"/>"#
            ));
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");
    let mut rows: Vec<u32> = sheet.cells.iter().map(|(r, _)| row_of(r)).collect();
    rows.sort_unstable();
    rows.dedup();
    for row in rows {
        xml.push_str(&format!(r#"<row r="{row}">"#));
        for (cell_ref, value) in sheet.cells.iter().filter(|(r, _)| row_of(r) == row) {
            if value.parse::<f64>().is_ok() {
                xml.push_str(&format!(r#"<c r="{cell_ref}"><v>{value}</v></c>"#));
            } else {
                xml.push_str(&format!(
                    r#"<c r="{cell_ref}" t="inlineStr"><is><t>{value}</t></is></c>"#
                ));
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData>");

    if !sheet.merges.is_empty() {
        xml.push_str(&format!(r#"<mergeCells count="{}">"#, sheet.merges.len()));
        for merge in sheet.merges {
            xml.push_str(&format!(r#"<mergeCell ref="{merge}"/>"#));
        }
        xml.push_str("</mergeCells>");
    }

    xml.push_str("</worksheet>");
    xml
}

// Build a minimal valid XLSX file in memory
pub fn create_mock_xlsx(sheets: &[MockSheet<'_>]) -> anyhow::Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options)?;
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
"#,
    );
    for i in 1..=sheets.len() {
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    content_types.push_str("</Types>");
    zip.write_all(content_types.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
    )?;

    zip.start_file("xl/workbook.xml", options)?;
    let mut workbook_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        workbook_xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            sheet.name,
            i + 1,
            i + 1
        ));
    }
    workbook_xml.push_str("</sheets></workbook>");
    zip.write_all(workbook_xml.as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    let mut rels_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for i in 1..=sheets.len() {
        rels_xml.push_str(&format!(
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }
    rels_xml.push_str("</Relationships>");
    zip.write_all(rels_xml.as_bytes())?;

    for (i, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(sheet_xml(sheet).as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

// Build a single-table ODS file: "Data" with a merged A1:B2 header, a 2.54cm
// first column and a numeric cell at A3
pub fn create_mock_ods() -> anyhow::Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.start_file("mimetype", options)?;
    zip.write_all(b"application/vnd.oasis.opendocument.spreadsheet")?;

    zip.start_file("META-INF/manifest.xml", options)?;
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
<manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/>
<manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#,
    )?;

    // No whitespace between elements: calamine's ODS reader rejects it
    zip.start_file("content.xml", options)?;
    let content = concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        r#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" office:version="1.2">"#,
        r#"<office:automatic-styles>"#,
        r#"<style:style style:name="co1" style:family="table-column"><style:table-column-properties style:column-width="2.54cm"/></style:style>"#,
        r#"</office:automatic-styles>"#,
        r#"<office:body><office:spreadsheet>"#,
        r#"<table:table table:name="Data">"#,
        r#"<table:table-column table:style-name="co1"/>"#,
        r#"<table:table-column/>"#,
        r#"<table:table-row>"#,
        r#"<table:table-cell table:number-columns-spanned="2" table:number-rows-spanned="2" office:value-type="string"><text:p>Title</text:p></table:table-cell>"#,
        r#"<table:covered-table-cell/>"#,
        r#"</table:table-row>"#,
        r#"<table:table-row>"#,
        r#"<table:covered-table-cell table:number-columns-repeated="2"/>"#,
        r#"</table:table-row>"#,
        r#"<table:table-row>"#,
        r#"<table:table-cell office:value-type="float" office:value="7"><text:p>7</text:p></table:table-cell>"#,
        r#"<table:table-cell/>"#,
        r#"</table:table-row>"#,
        r#"</table:table>"#,
        r#"</office:spreadsheet></office:body>"#,
        r#"</office:document-content>"#,
    );
    zip.write_all(content.as_bytes())?;

    Ok(zip.finish()?.into_inner())
}
