//! Output rendering: JSON, YAML, and tables.

use anyhow::Result;
use clap::ValueEnum;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Table,
}

/// Print `data` as JSON or YAML. Table output never goes through here;
/// each command renders its own projections.
pub fn print_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
        OutputFormat::Table => unreachable!("table output is rendered per command"),
    }
    Ok(())
}

/// Print a titled table of rows.
pub fn print_table(title: Option<&str>, header: &[&str], rows: Vec<Vec<String>>) {
    if let Some(title) = title {
        println!("{title}");
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

/// Print a single resource as a one-row table.
pub fn print_single_table(title: Option<&str>, header: &[&str], values: Vec<String>) {
    print_table(title, header, vec![values]);
}
