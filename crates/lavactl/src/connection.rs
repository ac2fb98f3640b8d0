//! Resolves CLI flags and environment into a configured client.

use anyhow::{Context, Result};
use lava_api::LavaClient;
use tracing::debug;

use crate::cli::Cli;

pub fn create_client(cli: &Cli) -> Result<LavaClient> {
    let tenant = cli
        .tenant
        .as_deref()
        .context("no tenant id configured; pass --tenant or set LAVA_TENANT_ID")?;
    let token = cli
        .token
        .as_deref()
        .context("no auth token configured; pass --token or set LAVA_AUTH_TOKEN")?;

    let mut builder = LavaClient::builder().tenant(tenant).token(token);
    if let Some(api_url) = &cli.api_url {
        debug!(%api_url, "using custom API endpoint");
        builder = builder.api_url(api_url);
    }
    builder.build().context("failed to build API client")
}
