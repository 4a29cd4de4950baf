//! # Run Subcommand
//!
//! Replays a YAML script of routing commands against the loaded board.
//! Each step prints one `OK:` or `REJECTED:` line. A refused step leaves
//! its contract where it was and, unless `--stop-on-error` is given, the
//! script carries on.
//!
//! ```yaml
//! steps:
//!   - command: take
//!     contract: C-001
//!     actor: { name: Ivan, department: Manager }
//!   - command: send
//!     contract: C-001
//!     actor: { name: Ivan, department: Manager }
//!     target: { name: Tatiana, department: Delivery }
//!   - command: reject
//!     contract: C-003
//!     actor: { name: Ivan, department: Manager }
//!     reason: price too high
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use lway_core::{Actor, ContractId};
use lway_routing::{classify, Location, NewContract, RoutingEngine, RoutingError};

use crate::board::render_summary;

/// Arguments for the `lway run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the YAML command script.
    #[arg(long)]
    pub script: PathBuf,

    /// Stop at the first refused step.
    #[arg(long)]
    pub stop_on_error: bool,

    /// Print the full audit log in commit order after the script.
    #[arg(long)]
    pub audit: bool,
}

/// A parsed command script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("malformed command script")
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }
}

/// One scripted command.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Step {
    /// Intake of a new contract.
    Register { contract: NewContract },
    Take {
        contract: ContractId,
        actor: Actor,
    },
    Accept {
        contract: ContractId,
        actor: Actor,
    },
    Reject {
        contract: ContractId,
        actor: Actor,
        #[serde(default)]
        reason: String,
    },
    Return {
        contract: ContractId,
        actor: Actor,
    },
    Send {
        contract: ContractId,
        actor: Actor,
        #[serde(default)]
        target: Option<Actor>,
    },
    Comment {
        contract: ContractId,
        actor: Actor,
        text: String,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Take { .. } => "take",
            Self::Accept { .. } => "accept",
            Self::Reject { .. } => "reject",
            Self::Return { .. } => "return",
            Self::Send { .. } => "send",
            Self::Comment { .. } => "comment",
        }
    }

    pub fn contract_id(&self) -> &ContractId {
        match self {
            Self::Register { contract } => &contract.id,
            Self::Take { contract, .. }
            | Self::Accept { contract, .. }
            | Self::Reject { contract, .. }
            | Self::Return { contract, .. }
            | Self::Send { contract, .. }
            | Self::Comment { contract, .. } => contract,
        }
    }

    /// The issuing actor. Intake has none.
    pub fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Register { .. } => None,
            Self::Take { actor, .. }
            | Self::Accept { actor, .. }
            | Self::Reject { actor, .. }
            | Self::Return { actor, .. }
            | Self::Send { actor, .. }
            | Self::Comment { actor, .. } => Some(actor),
        }
    }
}

/// Result of one script step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// 1-based position in the script.
    pub index: usize,
    pub command: &'static str,
    pub contract_id: ContractId,
    pub actor: Option<String>,
    /// Where the contract sits after the step, or why it was refused.
    pub result: Result<Location, RoutingError>,
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let by = self
            .actor
            .as_deref()
            .map(|a| format!(" by {a}"))
            .unwrap_or_default();
        match &self.result {
            Ok(location) => write!(
                f,
                "OK: [{}] {} {}{by} → {location}",
                self.index, self.command, self.contract_id
            ),
            Err(e) => write!(
                f,
                "REJECTED: [{}] {} {}{by}: {}: {e}",
                self.index,
                self.command,
                self.contract_id,
                e.kind()
            ),
        }
    }
}

/// Apply one step to the engine.
pub async fn apply_step(engine: &RoutingEngine, step: &Step) -> Result<Location, RoutingError> {
    let contract = match step {
        Step::Register { contract } => engine.register(contract.clone())?,
        Step::Take { contract, actor } => engine.take(contract, actor).await?,
        Step::Accept { contract, actor } => engine.accept(contract, actor)?,
        Step::Reject {
            contract,
            actor,
            reason,
        } => engine.reject(contract, actor, reason)?,
        Step::Return { contract, actor } => engine.return_to_work(contract, actor)?,
        Step::Send {
            contract,
            actor,
            target,
        } => engine.send(contract, actor, target.clone())?,
        Step::Comment {
            contract,
            actor,
            text,
        } => {
            engine.comment(contract, actor, text)?;
            return engine.location_of(contract);
        }
    };
    Ok(classify(&contract))
}

/// Apply every step in order and collect the outcomes.
pub async fn execute(engine: &RoutingEngine, script: &Script, stop_on_error: bool) -> Vec<StepOutcome> {
    let mut outcomes = Vec::with_capacity(script.steps.len());
    for (i, step) in script.steps.iter().enumerate() {
        let result = apply_step(engine, step).await;
        let refused = result.is_err();
        outcomes.push(StepOutcome {
            index: i + 1,
            command: step.name(),
            contract_id: step.contract_id().clone(),
            actor: step.actor().map(|a| a.name.to_string()),
            result,
        });
        if refused && stop_on_error {
            tracing::warn!(step = i + 1, "stopping script at refused step");
            break;
        }
    }
    outcomes
}

/// One line per committed transition, across all contracts, in commit
/// order.
pub fn render_audit(engine: &RoutingEngine) -> Vec<String> {
    engine
        .registry()
        .audit_log()
        .all()
        .iter()
        .map(|e| {
            let mut line = format!(
                "AUDIT: #{} {} {} by {}: {} → {}",
                e.sequence,
                e.command,
                e.contract_id,
                e.actor.name,
                e.from,
                e.to
            );
            if let Some(detail) = &e.detail {
                line.push_str(&format!(" ({detail})"));
            }
            line
        })
        .collect()
}

/// Execute the run subcommand.
pub async fn run_script(args: &RunArgs, engine: &RoutingEngine) -> Result<u8> {
    let script = Script::from_yaml_file(&args.script)?;
    tracing::info!(
        steps = script.steps.len(),
        script = %args.script.display(),
        claim_confirmation_ms = engine.config().claim_confirmation_ms,
        "running script"
    );

    let outcomes = execute(engine, &script, args.stop_on_error).await;
    for outcome in &outcomes {
        println!("{outcome}");
    }
    println!("{}", render_summary(&engine.pool_summary()));
    if args.audit {
        for line in render_audit(engine) {
            println!("{line}");
        }
    }

    let refused = outcomes.iter().filter(|o| o.result.is_err()).count();
    if refused > 0 {
        println!("{refused} of {} steps refused", outcomes.len());
        return Ok(2);
    }
    Ok(0)
}
