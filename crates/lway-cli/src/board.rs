//! # Board Subcommand
//!
//! Prints the routing board: one section per (pool, sub-pool) with a count
//! badge, the way the contract board lays out its columns.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use lway_core::ActorName;
use lway_routing::{
    classify, Contract, ContractFilter, Pool, PoolSummary, RoutingEngine, SubPool,
};

/// Arguments for the `lway board` subcommand.
#[derive(Args, Debug)]
pub struct BoardArgs {
    /// Only show one pool.
    #[arg(long, value_enum)]
    pub pool: Option<PoolArg>,

    /// Only show contracts assigned to this actor.
    #[arg(long)]
    pub assignee: Option<String>,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Pool selector on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PoolArg {
    Incoming,
    Work,
    Outgoing,
}

impl From<PoolArg> for Pool {
    fn from(arg: PoolArg) -> Self {
        match arg {
            PoolArg::Incoming => Pool::Incoming,
            PoolArg::Work => Pool::Work,
            PoolArg::Outgoing => Pool::Outgoing,
        }
    }
}

/// Execute the board subcommand.
pub fn run_board(args: &BoardArgs, engine: &RoutingEngine) -> Result<u8> {
    let assignee = args
        .assignee
        .as_deref()
        .map(ActorName::new)
        .transpose()
        .context("invalid --assignee")?;
    let pool = args.pool.map(Pool::from);

    if args.json {
        let value = render_json(engine, pool, assignee.as_ref());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render_text(engine, pool, assignee.as_ref()));
    }
    Ok(0)
}

fn sections(pool: Pool) -> Vec<(Pool, Option<SubPool>)> {
    match pool {
        Pool::Work => vec![(Pool::Work, None)],
        _ => vec![
            (pool, Some(SubPool::Free)),
            (pool, Some(SubPool::Addressed)),
        ],
    }
}

fn section_filter(
    pool: Pool,
    sub_pool: Option<SubPool>,
    assignee: Option<&ActorName>,
) -> ContractFilter {
    ContractFilter {
        pool: Some(pool),
        sub_pool,
        assignee: assignee.cloned(),
        stage: None,
    }
}

fn section_title(pool: Pool, sub_pool: Option<SubPool>) -> String {
    match sub_pool {
        Some(sub) => format!("{pool}/{sub}"),
        None => pool.to_string(),
    }
}

/// One listing line for a contract.
pub fn render_line(contract: &Contract) -> String {
    let mut line = format!(
        "  {}  {} | {} | {}",
        contract.id,
        contract.title,
        contract.stage.label(),
        contract.time_remaining.as_str()
    );
    if let Some(from) = &contract.assigned_from {
        line.push_str(&format!(" | from {from}"));
    }
    if let Some(to) = &contract.assigned_to {
        line.push_str(&format!(" | to {to}"));
    }
    if let Some(by) = &contract.dispatched_by {
        line.push_str(&format!(" | sent by {by}"));
    }
    if let Some(rejection) = &contract.rejection {
        line.push_str(&format!(" | rejected: {}", rejection.reason));
    }
    line
}

/// Text rendering of the board, optionally narrowed to one pool and one
/// assignee.
pub fn render_text(engine: &RoutingEngine, pool: Option<Pool>, assignee: Option<&ActorName>) -> String {
    let mut out = String::new();
    let pools: Vec<Pool> = match pool {
        Some(p) => vec![p],
        None => Pool::ALL.to_vec(),
    };
    let mut shown = 0;
    for pool in pools {
        for (pool, sub_pool) in sections(pool) {
            let contracts = engine.list(&section_filter(pool, sub_pool, assignee));
            shown += contracts.len();
            out.push_str(&format!(
                "{} ({})\n",
                section_title(pool, sub_pool),
                contracts.len()
            ));
            for contract in &contracts {
                out.push_str(&render_line(contract));
                out.push('\n');
            }
        }
    }
    out.push_str(&format!("Shown: {shown} of {}\n", engine.pool_summary().total()));
    out
}

/// One-line count summary.
pub fn render_summary(summary: &PoolSummary) -> String {
    format!(
        "INCOMING/FREE {} | INCOMING/ADDRESSED {} | WORK {} | OUTGOING/FREE {} | OUTGOING/ADDRESSED {} | TOTAL {}",
        summary.incoming_free,
        summary.incoming_addressed,
        summary.work,
        summary.outgoing_free,
        summary.outgoing_addressed,
        summary.total()
    )
}

/// JSON rendering: the pool summary plus the listed contracts with their
/// derived location and status.
pub fn render_json(
    engine: &RoutingEngine,
    pool: Option<Pool>,
    assignee: Option<&ActorName>,
) -> serde_json::Value {
    let filter = ContractFilter {
        pool,
        sub_pool: None,
        assignee: assignee.cloned(),
        stage: None,
    };
    let contracts: Vec<serde_json::Value> = engine
        .list(&filter)
        .into_iter()
        .map(|contract| {
            let location = classify(&contract);
            serde_json::json!({
                "location": location.to_string(),
                "status": location.display_status().label(),
                "contract": contract,
            })
        })
        .collect();
    serde_json::json!({
        "summary": engine.pool_summary(),
        "contracts": contracts,
    })
}
