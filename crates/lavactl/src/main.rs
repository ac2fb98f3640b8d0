//! lavactl: command-line interface for the Rackspace Cloud Big Data API.

mod cli;
mod commands;
mod connection;
mod output;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lavactl={default_level},lava_api={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = commands::execute(cli).await {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
