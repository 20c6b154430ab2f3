//! Output formatting utilities for the APQP CLI.
//!
//! Supports table, JSON, and YAML output formats.

use anyhow::Result;
use apqp_core::models::Record;
use clap::ValueEnum;
use colored::*;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

/// Output format selection.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Render as a formatted table
    #[default]
    Table,
    /// Render as JSON
    Json,
    /// Render as YAML
    Yaml,
}

/// One table row per backend record.
#[derive(Debug, Serialize, Tabled)]
pub struct RecordRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Name")]
    pub label: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl RecordRow {
    pub fn from_record<T: Record>(record: &T) -> Self {
        Self {
            id: record.id(),
            label: record.label(),
            status: record.status().unwrap_or("-").to_string(),
        }
    }
}

/// Print a success message to stdout.
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), msg);
}

/// Print an informational message to stdout.
pub fn print_info(msg: &str) {
    println!("{} {}", "[INFO]".blue().bold(), msg);
}

/// Print a list of items in the requested format.
///
/// For table output, items must implement `Tabled`. For JSON/YAML, items must
/// implement `Serialize`.
pub fn print_list<T: Tabled + Serialize>(items: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No results found.".dimmed());
                return Ok(());
            }
            let table = Table::new(items)
                .with(Style::rounded())
                .with(Modify::new(Columns::first()).with(Alignment::left()))
                .to_string();
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::Yaml => print_item(&items, format)?,
    }
    Ok(())
}

/// Print backend records: a summary table, or the full records as JSON/YAML.
pub fn print_records<T: Record + Serialize>(items: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<RecordRow> = items.iter().map(RecordRow::from_record).collect();
            print_list(&rows, format)
        }
        OutputFormat::Json | OutputFormat::Yaml => print_item(&items, format),
    }
}

/// Print a single item in the requested format.
pub fn print_item<T: Serialize + ?Sized>(item: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(item)?);
        }
    }
    Ok(())
}

/// Print key-value details to the terminal (non-JSON/YAML output).
pub fn print_detail(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Print a section header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", title.bold().underline());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use apqp_core::models::Todo;
    use serde_json::json;

    #[test]
    fn test_record_row_uses_label_and_status() {
        let todo: Todo =
            serde_json::from_value(json!({"id": 4, "title": "Submit PSW", "status": "open"}))
                .unwrap();
        let row = RecordRow::from_record(&todo);
        assert_eq!(row.id, 4);
        assert_eq!(row.label, "Submit PSW");
        assert_eq!(row.status, "open");
    }

    #[test]
    fn test_record_row_without_status() {
        let dept: apqp_core::models::Department =
            serde_json::from_value(json!({"id": 2, "name": "Quality"})).unwrap();
        assert_eq!(RecordRow::from_record(&dept).status, "-");
    }
}
