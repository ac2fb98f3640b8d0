//! Command dispatch.

mod clusters;
mod flavors;
mod scripts;
mod stacks;
mod workloads;

use anyhow::Result;

use crate::cli::{Cli, Command};
use crate::connection::create_client;

pub async fn execute(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Version => {
            println!("lavactl {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Cluster(command) => {
            let client = create_client(&cli)?;
            clusters::execute(client, command, cli.output).await
        }
        Command::Stack(command) => {
            let client = create_client(&cli)?;
            stacks::execute(client, command, cli.output).await
        }
        Command::Flavor(command) => {
            let client = create_client(&cli)?;
            flavors::execute(client, command, cli.output).await
        }
        Command::Workload(command) => {
            let client = create_client(&cli)?;
            workloads::execute(client, command, cli.output).await
        }
        Command::Script(command) => {
            let client = create_client(&cli)?;
            scripts::execute(client, command, cli.output).await
        }
    }
}
