//! XML parsing utilities for extracting sheet layout from XLSX archives

use super::SheetLayout;
use crate::cell_ref::CellRange;
use crate::error::Result;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::BufReader;
use zip::ZipArchive;

/// Highest column index a worksheet can address
const MAX_COLUMN: u32 = 16_383;

/// Resolve each sheet name to its worksheet part path inside the archive.
///
/// Sheets are linked to their parts through `r:id` relationships declared in
/// `xl/_rels/workbook.xml.rels`. Sheets without a resolvable part are skipped.
pub fn read_sheet_paths(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<Vec<(String, String)>> {
    let rels = read_workbook_relationships(archive)?;
    let mut sheets = Vec::new();

    let workbook_xml = match archive.by_name("xl/workbook.xml") {
        Ok(file) => file,
        Err(_) => return Ok(sheets),
    };

    let mut reader = Reader::from_reader(BufReader::new(workbook_xml));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                let mut name = String::new();
                let mut rel_id = String::new();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => name = attr.unescape_value().unwrap_or_default().into(),
                        // r:id, whatever the relationship namespace prefix is
                        _ if attr.key.local_name().as_ref() == b"id" => {
                            rel_id = String::from_utf8_lossy(&attr.value).to_string();
                        }
                        _ => {}
                    }
                }
                if let Some(target) = rels.get(&rel_id) {
                    sheets.push((name, target.clone()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Map relationship ids to archive paths, normalized to be rooted at the archive
fn read_workbook_relationships(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<HashMap<String, String>> {
    let mut rels = HashMap::new();

    let rels_xml = match archive.by_name("xl/_rels/workbook.xml.rels") {
        Ok(file) => file,
        Err(_) => return Ok(rels),
    };

    let mut reader = Reader::from_reader(BufReader::new(rels_xml));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"Relationship" => {
                let mut id = String::new();
                let mut target = String::new();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = attr.unescape_value().unwrap_or_default().into(),
                        _ => {}
                    }
                }
                if !id.is_empty() && !target.is_empty() {
                    rels.insert(id, normalize_target(&target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Targets are relative to `xl/` unless they are absolute package paths
fn normalize_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

/// Extract the declared dimension, merged cells and column widths of one worksheet
pub fn extract_sheet_layout_from_xlsx(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
    sheet_path: &str,
) -> Result<SheetLayout> {
    let mut layout = SheetLayout::default();

    let sheet_xml = match archive.by_name(sheet_path) {
        Ok(file) => file,
        Err(_) => return Ok(layout),
    };

    let mut reader = Reader::from_reader(BufReader::new(sheet_xml));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"dimension" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"ref" {
                            let range = String::from_utf8_lossy(&attr.value).to_string();
                            if !range.is_empty() {
                                layout.declared_range = Some(range);
                            }
                        }
                    }
                }
                b"col" => {
                    let mut min_col = None;
                    let mut max_col = None;
                    let mut width = None;

                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value);
                        match attr.key.as_ref() {
                            // 1-based in the file
                            b"min" => min_col = value.parse::<u32>().ok().map(|v| v.saturating_sub(1)),
                            b"max" => max_col = value.parse::<u32>().ok().map(|v| v.saturating_sub(1)),
                            b"width" => width = value.parse::<f64>().ok(),
                            _ => {}
                        }
                    }

                    if let (Some(min_col), Some(width)) = (min_col, width) {
                        let max_col = max_col.unwrap_or(min_col).min(MAX_COLUMN);
                        for col in min_col..=max_col {
                            layout.column_widths.insert(col, width);
                        }
                    }
                }
                b"mergeCell" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"ref" {
                            let ref_str = String::from_utf8_lossy(&attr.value);
                            if let Some(region) = CellRange::decode(&ref_str) {
                                layout.merged_cells.push(region);
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn archive_with(entries: &[(&str, &str)]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, body) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        let bytes = zip.finish().unwrap().into_inner();
        ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_normalize_target() {
        assert_eq!(normalize_target("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(normalize_target("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_read_sheet_paths_follows_relationships() {
        let mut archive = archive_with(&[
            (
                "xl/workbook.xml",
                r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>
<sheet name="Q&amp;A" sheetId="1" r:id="rId2"/>
<sheet name="Data" sheetId="2" r:id="rId1"/>
</sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships>
<Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="worksheet" Target="/xl/worksheets/sheet2.xml"/>
</Relationships>"#,
            ),
        ]);

        let sheets = read_sheet_paths(&mut archive).unwrap();
        assert_eq!(
            sheets,
            vec![
                ("Q&A".to_string(), "xl/worksheets/sheet2.xml".to_string()),
                ("Data".to_string(), "xl/worksheets/sheet1.xml".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_sheet_layout() {
        let mut archive = archive_with(&[(
            "xl/worksheets/sheet1.xml",
            r#"<worksheet><dimension ref="B2:D5"/>
<cols><col min="1" max="1" width="20.5" customWidth="1"/><col min="3" max="4" width="9"/></cols>
<sheetData/>
<mergeCells count="2"><mergeCell ref="B2:C2"/><mergeCell ref="D3:D5"/></mergeCells>
</worksheet>"#,
        )]);

        let layout = extract_sheet_layout_from_xlsx(&mut archive, "xl/worksheets/sheet1.xml").unwrap();
        assert_eq!(layout.declared_range.as_deref(), Some("B2:D5"));
        assert_eq!(
            layout.merged_cells,
            vec![CellRange::from_bounds(1, 1, 1, 2), CellRange::from_bounds(2, 3, 4, 3)]
        );
        assert_eq!(layout.column_widths.get(&0), Some(&20.5));
        assert_eq!(layout.column_widths.get(&1), None);
        assert_eq!(layout.column_widths.get(&2), Some(&9.0));
        assert_eq!(layout.column_widths.get(&3), Some(&9.0));
    }

    #[test]
    fn test_missing_sheet_part_yields_empty_layout() {
        let mut archive = archive_with(&[("xl/workbook.xml", "<workbook/>")]);
        let layout = extract_sheet_layout_from_xlsx(&mut archive, "xl/worksheets/sheet9.xml").unwrap();
        assert!(layout.declared_range.is_none());
        assert!(layout.merged_cells.is_empty());
    }
}
