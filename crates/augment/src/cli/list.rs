//! The `augment list` command: operator catalog with effective parameters.

use augment_core::{Config, OperatorId, Registry};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct CatalogEntry {
    id: OperatorId,
    name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

/// Catalog entries with the parameters the loaded config resolves to.
fn catalog(config: &Config) -> Vec<CatalogEntry> {
    Registry::standard()
        .descriptors()
        .into_iter()
        .map(|d| CatalogEntry {
            id: d.id,
            name: d.display_name,
            parameters: config.operators.section(d.id),
        })
        .collect()
}

/// Execute the list command.
pub fn execute(args: ListArgs, config: &Config) -> anyhow::Result<()> {
    let entries = catalog(config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        let params = match &entry.parameters {
            Some(value) => value.to_string(),
            None => "-".to_string(),
        };
        println!("{:<14} {:<26} {}", entry.id, entry.name, params);
    }
    Ok(())
}
