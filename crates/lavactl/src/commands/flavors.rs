//! Flavor commands.

use anyhow::Result;
use lava_api::{Flavor, FlavorHandler, LavaClient};

use crate::cli::FlavorCommand;
use crate::output::{print_output, print_table, OutputFormat};

pub async fn execute(
    client: LavaClient,
    command: &FlavorCommand,
    format: OutputFormat,
) -> Result<()> {
    let handler = FlavorHandler::new(client);
    match command {
        FlavorCommand::List => {
            let flavors = handler.list().await?;
            if format == OutputFormat::Table {
                let rows = flavors.iter().map(Flavor::table_row).collect();
                print_table(Some("Flavors"), Flavor::table_header(), rows);
            } else {
                print_output(&flavors, format)?;
            }
            Ok(())
        }
    }
}
