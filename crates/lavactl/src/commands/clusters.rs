//! Cluster commands.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use lava_api::clusters::{CLUSTER_SCRIPT, DETAIL_HEADER, NODE_GROUP};
use lava_api::progress::ProgressEvent;
use lava_api::{
    Cluster, ClusterCreateParams, ClusterDetail, ClusterHandler, LavaClient, NodeGroupSpec,
    ProgressCallback,
};

use crate::cli::ClusterCommand;
use crate::output::{print_output, print_single_table, print_table, OutputFormat};

pub async fn execute(
    client: LavaClient,
    command: &ClusterCommand,
    format: OutputFormat,
) -> Result<()> {
    let handler = ClusterHandler::new(client);
    match command {
        ClusterCommand::List => {
            let clusters = handler.list().await?;
            if format == OutputFormat::Table {
                let rows = clusters.iter().map(Cluster::table_row).collect();
                print_table(Some("Clusters"), Cluster::table_header(), rows);
            } else {
                print_output(&clusters, format)?;
            }
            Ok(())
        }
        ClusterCommand::Get { cluster_id } => {
            let detail = handler.get(cluster_id).await?;
            print_detail(&detail, format)
        }
        ClusterCommand::Create {
            name,
            username,
            keypair,
            stack,
            node_groups,
            wait,
            wait_interval,
            wait_timeout,
        } => {
            let mut params = ClusterCreateParams::new(name, username, keypair, stack);
            for spec in node_groups {
                params = params.with_node_group(parse_node_group(spec)?);
            }
            let created = handler.create(params).await?;

            if *wait {
                let detail = wait_with_spinner(
                    &handler,
                    created.id(),
                    *wait_interval,
                    *wait_timeout,
                )
                .await?;
                print_detail(&detail, format)
            } else {
                print_detail(&created, format)
            }
        }
        ClusterCommand::Delete { cluster_id } => {
            handler.delete(cluster_id).await?;
            println!("Cluster {cluster_id} deleted");
            Ok(())
        }
        ClusterCommand::Wait {
            cluster_id,
            interval,
            timeout,
        } => {
            let detail = wait_with_spinner(&handler, cluster_id, *interval, *timeout).await?;
            print_detail(&detail, format)
        }
    }
}

async fn wait_with_spinner(
    handler: &ClusterHandler,
    cluster_id: &str,
    interval_secs: u64,
    timeout_secs: Option<u64>,
) -> Result<ClusterDetail> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let pb = spinner.clone();
    let callback: ProgressCallback = Box::new(move |event| match event {
        ProgressEvent::Started { resource_id } => {
            pb.set_message(format!("waiting for cluster {resource_id}"));
        }
        ProgressEvent::Polling {
            status,
            elapsed_minutes,
            ..
        } => {
            pb.set_message(format!("status {status} ({elapsed_minutes:.1} min elapsed)"));
        }
        ProgressEvent::Finished { status, .. } => {
            pb.finish_with_message(format!("cluster reached {status}"));
        }
    });

    let result = handler
        .wait(
            cluster_id,
            Duration::from_secs(interval_secs),
            timeout_secs.map(Duration::from_secs),
            Some(&callback),
        )
        .await;
    if !spinner.is_finished() {
        spinner.finish_and_clear();
    }
    Ok(result?)
}

fn print_detail(detail: &ClusterDetail, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        return print_output(detail, format);
    }
    print_single_table(Some("Cluster"), DETAIL_HEADER, detail.detail_row());
    let groups = detail.node_group_rows();
    if !groups.is_empty() {
        print_table(Some("Node Groups"), NODE_GROUP.table_header, groups);
    }
    let scripts = detail.script_rows();
    if !scripts.is_empty() {
        print_table(Some("Scripts"), CLUSTER_SCRIPT.table_header, scripts);
    }
    Ok(())
}

/// Parse a node group argument: a bare id, or `id(count=10, flavor_id=x)`.
fn parse_node_group(spec: &str) -> Result<NodeGroupSpec> {
    let spec = spec.trim();
    let Some((id, rest)) = spec.split_once('(') else {
        if spec.is_empty() {
            bail!("empty node group spec");
        }
        return Ok(NodeGroupSpec::new(spec));
    };

    let id = id.trim();
    if id.is_empty() {
        bail!("node group spec '{spec}' is missing an id");
    }
    let args = rest
        .strip_suffix(')')
        .ok_or_else(|| anyhow!("node group spec '{spec}' is missing a closing ')'"))?;

    let mut group = NodeGroupSpec::new(id);
    for pair in args.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value in node group spec, got '{pair}'"))?;
        match key.trim() {
            "count" => {
                let count = value
                    .trim()
                    .parse()
                    .map_err(|_| anyhow!("count must be an integer, got '{}'", value.trim()))?;
                group = group.with_count(count);
            }
            "flavor_id" => {
                group = group.with_flavor_id(value.trim());
            }
            other => bail!("unknown node group option '{other}'"),
        }
    }
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_id() {
        let group = parse_node_group("slave").unwrap();
        assert_eq!(group.id, "slave");
        assert_eq!(group.count, None);
        assert_eq!(group.flavor_id, None);
    }

    #[test]
    fn parses_full_spec_with_spaces() {
        let group = parse_node_group("id(count=10, flavor_id=flavor)").unwrap();
        assert_eq!(group.id, "id");
        assert_eq!(group.count, Some(10));
        assert_eq!(group.flavor_id.as_deref(), Some("flavor"));
    }

    #[test]
    fn rejects_malformed_specs() {
        assert!(parse_node_group("id(count=10").is_err());
        assert!(parse_node_group("(count=10)").is_err());
        assert!(parse_node_group("id(count=ten)").is_err());
        assert!(parse_node_group("id(size=10)").is_err());
        assert!(parse_node_group("").is_err());
    }

    #[test]
    fn empty_parens_are_a_plain_id() {
        let group = parse_node_group("slave()").unwrap();
        assert_eq!(group.id, "slave");
        assert_eq!(group.count, None);
    }
}
