//! Script commands.

use anyhow::Result;
use lava_api::{LavaClient, Script, ScriptHandler, ScriptParams};

use crate::cli::ScriptCommand;
use crate::output::{print_output, print_single_table, print_table, OutputFormat};

pub async fn execute(
    client: LavaClient,
    command: &ScriptCommand,
    format: OutputFormat,
) -> Result<()> {
    let handler = ScriptHandler::new(client);
    match command {
        ScriptCommand::List => {
            let scripts = handler.list().await?;
            if format == OutputFormat::Table {
                let rows = scripts.iter().map(Script::table_row).collect();
                print_table(Some("Scripts"), Script::table_header(), rows);
            } else {
                print_output(&scripts, format)?;
            }
            Ok(())
        }
        ScriptCommand::Create {
            name,
            url,
            script_type,
        } => {
            let script = handler
                .create(ScriptParams::new(name, url, script_type))
                .await?;
            print_one(&script, format)
        }
        ScriptCommand::Update {
            script_id,
            name,
            url,
            script_type,
        } => {
            let script = handler
                .update(script_id, ScriptParams::new(name, url, script_type))
                .await?;
            print_one(&script, format)
        }
        ScriptCommand::Delete { script_id } => {
            handler.delete(script_id).await?;
            println!("Script {script_id} deleted");
            Ok(())
        }
    }
}

fn print_one(script: &Script, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Table {
        print_single_table(Some("Script"), Script::table_header(), script.table_row());
        Ok(())
    } else {
        print_output(script, format)
    }
}
