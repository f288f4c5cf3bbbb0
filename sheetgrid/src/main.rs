use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sheetgrid_core::{Content, ContentSource, GridConfig, SpreadsheetModel};
use std::path::PathBuf;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetgrid")]
#[command(about = "Render Excel/ODS/CSV sheets the way a grid view sees them", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the Excel/ODS/CSV file to open
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Sheet to show (defaults to the first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Maximum number of rows to print
    #[arg(short = 'n', long)]
    rows: Option<u32>,

    /// Only list the sheet names
    #[arg(short, long)]
    list: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored table
    Human,
    /// JSON rows, columns and merge metadata
    Json,
    /// Delimited text export of the sheet
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        GridConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("sheetgrid.toml");
        if default_config_path.exists() {
            GridConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            GridConfig::default()
        }
    };

    let bytes = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read file: {}", cli.file.display()))?;

    let source = ContentSource::new();
    let model = SpreadsheetModel::with_config(&source, config);
    source
        .publish(Content::binary(bytes))
        .with_context(|| format!("Failed to parse file: {}", cli.file.display()))?;

    if cli.list {
        for name in model.sheet_names() {
            println!("{name}");
        }
        return Ok(());
    }

    if let Some(sheet) = &cli.sheet {
        if !model.sheet_names().iter().any(|name| name == sheet) {
            anyhow::bail!(
                "Sheet '{}' not found; available sheets: {}",
                sheet,
                model.sheet_names().join(", ")
            );
        }
        model.set_sheet(sheet.as_str());
    }

    let row_limit = cli
        .rows
        .map_or(model.row_count(), |limit| limit.min(model.row_count()));

    match cli.format {
        OutputFormat::Human => formatter::print_human(&cli.file, &model, row_limit),
        OutputFormat::Json => formatter::print_json(&cli.file, &model, row_limit)?,
        OutputFormat::Csv => {
            if let Some(csv) = model.to_csv(None).context("Failed to export CSV")? {
                print!("{csv}");
            }
        }
    }

    Ok(())
}
