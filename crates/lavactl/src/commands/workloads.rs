//! Workload commands.

use anyhow::Result;
use lava_api::workloads::{SIZE, WORKLOAD_HEADER};
use lava_api::{LavaClient, RecommendationParams, Workload, WorkloadHandler};

use crate::cli::WorkloadCommand;
use crate::output::{print_output, print_table, OutputFormat};

pub async fn execute(
    client: LavaClient,
    command: &WorkloadCommand,
    format: OutputFormat,
) -> Result<()> {
    let handler = WorkloadHandler::new(client);
    match command {
        WorkloadCommand::List => {
            let workloads = handler.list().await?;
            if format == OutputFormat::Table {
                let rows = workloads.iter().map(Workload::table_row).collect();
                print_table(Some("Workloads"), WORKLOAD_HEADER, rows);
            } else {
                print_output(&workloads, format)?;
            }
            Ok(())
        }
        WorkloadCommand::Recommendations {
            workload_id,
            storage_size,
            persistent,
        } => {
            let mut params = RecommendationParams::new(*storage_size);
            if let Some(persistent) = persistent {
                params = params.with_persistent(persistent);
            }
            let recommendations = handler.recommendations(workload_id, params).await?;
            if format != OutputFormat::Table {
                return print_output(&recommendations, format);
            }
            for rec in &recommendations {
                let requires = rec
                    .instance()
                    .get("requires")
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let title = if requires.is_empty() || requires == "[]" {
                    rec.name().to_string()
                } else {
                    format!("{} (requires {requires})", rec.name())
                };
                print_table(Some(&title), SIZE.table_header, rec.size_rows());
            }
            Ok(())
        }
    }
}
