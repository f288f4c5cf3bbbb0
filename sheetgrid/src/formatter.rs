//! Output formatters for sheet contents

use anyhow::Result;
use colored::*;
use sheetgrid_core::display::{self, ERROR_CLASS, MERGE_DOWN_CLASS, NUMBER_CLASS};
use sheetgrid_core::{ColumnFormatter, Row, SpreadsheetModel};
use std::collections::BTreeMap;
use std::path::Path;

const MAX_COLUMN_WIDTH: usize = 40;

/// Print the active sheet as an aligned, colored table
pub fn print_human(file_path: &Path, model: &SpreadsheetModel, row_limit: u32) {
    println!("{}", format!("File: {}", file_path.display()).bold());
    let sheet = model.active_sheet().unwrap_or_default();
    println!(
        "{} {} {}",
        "Sheet:".bold(),
        sheet.cyan().bold(),
        format!("({})", model.extent()).bright_black()
    );
    println!();

    let columns = model.columns();
    if columns.is_empty() {
        println!("{}", "(empty sheet)".bright_black());
        return;
    }

    let rows: Vec<Row> = (0..row_limit).map(|index| model.row(index)).collect();
    let widths: Vec<usize> = columns
        .iter()
        .map(|column| {
            rows.iter()
                .map(|row| column.format(row).chars().count())
                .chain(std::iter::once(column.name.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, &width)| format!("{:^width$}", column.name).bold().underline().to_string())
        .collect();
    println!("{}", header.join(" "));

    for row in &rows {
        let metadata = model.metadata(row.id());
        let line: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| {
                let text = truncate(&column.format(row), width);
                if column.formatter == ColumnFormatter::RowIndex {
                    return format!("{text:>width$}").bright_black().to_string();
                }

                let classes = display::cell_classes(row.get(&column.field), &metadata, &column.id);
                let padded = if classes.contains(&NUMBER_CLASS) {
                    format!("{text:>width$}")
                } else {
                    format!("{text:<width$}")
                };
                if classes.contains(&ERROR_CLASS) {
                    padded.red().to_string()
                } else if classes.contains(&MERGE_DOWN_CLASS) {
                    padded.underline().to_string()
                } else {
                    padded
                }
            })
            .collect();
        println!("{}", line.join(" "));
    }

    if row_limit < model.row_count() {
        println!();
        println!(
            "{}",
            format!("... {} more row(s)", model.row_count() - row_limit).bright_black()
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(width.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Print the active sheet in JSON format
pub fn print_json(file_path: &Path, model: &SpreadsheetModel, row_limit: u32) -> Result<()> {
    let rows: Vec<Row> = (0..row_limit).map(|index| model.row(index)).collect();
    let metadata: BTreeMap<u32, _> = (0..row_limit)
        .map(|index| (index, model.metadata(index)))
        .filter(|(_, metadata)| !metadata.is_empty())
        .collect();

    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "sheets": model.sheet_names(),
        "sheet": model.active_sheet(),
        "extent": model.extent().to_string(),
        "rowCount": model.row_count(),
        "columns": model.columns(),
        "rows": rows,
        "metadata": metadata,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
