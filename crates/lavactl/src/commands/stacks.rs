//! Stack commands.

use anyhow::{bail, Result};
use lava_api::stacks::{DETAIL_HEADER, STACK_NODE_GROUP};
use lava_api::{LavaClient, Stack, StackCreateParams, StackHandler};

use crate::cli::StackCommand;
use crate::output::{print_output, print_single_table, print_table, OutputFormat};

pub async fn execute(
    client: LavaClient,
    command: &StackCommand,
    format: OutputFormat,
) -> Result<()> {
    let handler = StackHandler::new(client);
    match command {
        StackCommand::List => {
            let stacks = handler.list().await?;
            if format == OutputFormat::Table {
                let rows = stacks.iter().map(Stack::table_row).collect();
                print_table(Some("Stacks"), Stack::table_header(), rows);
            } else {
                print_output(&stacks, format)?;
            }
            Ok(())
        }
        StackCommand::Get { stack_id } => {
            let detail = handler.get(stack_id).await?;
            if format != OutputFormat::Table {
                return print_output(&detail, format);
            }
            print_single_table(Some("Stack"), DETAIL_HEADER, detail.detail_row());
            let groups = detail.node_group_rows();
            if !groups.is_empty() {
                print_table(Some("Node Groups"), STACK_NODE_GROUP.table_header, groups);
            }
            Ok(())
        }
        StackCommand::Create {
            name,
            distro,
            description,
            services,
        } => {
            let mut params = StackCreateParams::new(name, distro);
            if let Some(description) = description {
                params = params.with_description(description);
            }
            for spec in services {
                let (name, modes) = parse_service(spec)?;
                params = params.with_service(name, modes);
            }
            let detail = handler.create(params).await?;
            if format != OutputFormat::Table {
                return print_output(&detail, format);
            }
            print_single_table(Some("Stack"), DETAIL_HEADER, detail.detail_row());
            Ok(())
        }
        StackCommand::Delete { stack_id } => {
            handler.delete(stack_id).await?;
            println!("Stack {stack_id} deleted");
            Ok(())
        }
    }
}

/// Parse a service argument: a bare name, or `name=mode1,mode2`.
fn parse_service(spec: &str) -> Result<(String, Vec<String>)> {
    let spec = spec.trim();
    if spec.is_empty() {
        bail!("empty service spec");
    }
    match spec.split_once('=') {
        None => Ok((spec.to_string(), Vec::new())),
        Some((name, modes)) => {
            let name = name.trim();
            if name.is_empty() {
                bail!("service spec '{spec}' is missing a name");
            }
            let modes = modes
                .split(',')
                .map(str::trim)
                .filter(|mode| !mode.is_empty())
                .map(str::to_string)
                .collect();
            Ok((name.to_string(), modes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_service() {
        assert_eq!(parse_service("HDFS").unwrap(), ("HDFS".to_string(), vec![]));
    }

    #[test]
    fn parses_service_with_modes() {
        assert_eq!(
            parse_service("HDFS=Secondary, NameNode").unwrap(),
            (
                "HDFS".to_string(),
                vec!["Secondary".to_string(), "NameNode".to_string()]
            )
        );
    }

    #[test]
    fn rejects_nameless_service() {
        assert!(parse_service("=mode").is_err());
        assert!(parse_service("").is_err());
    }
}
