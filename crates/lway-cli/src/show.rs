//! # Show Subcommand
//!
//! Prints one contract as JSON: the record, its derived location and
//! status, its stage position, the audit history and the comment thread.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lway_core::ContractId;
use lway_routing::{classify, RoutingEngine};

use crate::script::{execute, Script};

/// Arguments for the `lway show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Contract identifier (e.g., "C-001").
    #[arg(long)]
    pub id: String,

    /// Replay this script before showing the contract.
    #[arg(long)]
    pub after: Option<PathBuf>,
}

/// Execute the show subcommand.
pub async fn run_show(args: &ShowArgs, engine: &RoutingEngine) -> Result<u8> {
    if let Some(path) = &args.after {
        let script = Script::from_yaml_file(path)?;
        let outcomes = execute(engine, &script, false).await;
        tracing::debug!(steps = outcomes.len(), "replayed script before show");
    }
    let id = ContractId::new(args.id.as_str()).context("invalid --id")?;
    let view = contract_view(engine, &id)?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(0)
}

/// The full view of one contract.
pub fn contract_view(engine: &RoutingEngine, id: &ContractId) -> Result<serde_json::Value> {
    let contract = engine.get(id)?;
    let location = classify(&contract);
    Ok(serde_json::json!({
        "contract": contract,
        "location": location.to_string(),
        "state": engine.state_of(id)?,
        "status": location.display_status().label(),
        "stage": {
            "ordinal": contract.stage.ordinal(),
            "label": contract.stage.label(),
        },
        "history": engine.history(id)?,
        "comments": engine.comments(id)?,
    }))
}
