//! # Transition Engine
//!
//! Validates and applies the five routing commands. Each command has its
//! own operation and input contract:
//!
//! | Command | Legal from | Who | Effect |
//! |---|---|---|---|
//! | Take | `INCOMING_FREE` | anyone | claim, then `assigned_to = actor`, move to Work |
//! | Accept | `INCOMING_ADDRESSED` | `assigned_to` | move to Work |
//! | Reject | `INCOMING_ADDRESSED` | `assigned_to` | non-empty reason; move to Outgoing, clear `assigned_to` |
//! | Return | `OUTGOING_*` | `dispatched_by` | move to Work under the returning actor |
//! | Send | `WORK` | `assigned_to` | move to Outgoing, addressed if a target is given |
//!
//! Checks run in a fixed order: contract exists, state allows the command,
//! actor holds responsibility, payload is valid. The first failure is
//! returned and nothing changes.
//!
//! ## Take
//!
//! Take is split in three so the confirmation delay never holds a lock:
//! [`RoutingEngine::begin_take`] registers the claim (atomic with the state
//! check under the contract's slot lock), [`RoutingEngine::commit_take`]
//! re-validates and commits, [`RoutingEngine::abort_take`] gives up.
//! [`RoutingEngine::take`] runs all three with the configured delay; if its
//! future is dropped mid-delay the claim token is dropped with it and the
//! contract stays `INCOMING_FREE`.
//!
//! Stage is never read or written here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use lway_core::{Actor, ContractId, Timestamp};

use crate::audit::AuditEvent;
use crate::claim::{ClaimCoordinator, ClaimToken};
use crate::classifier::{classify, Location, Pool, RoutingState, SubPool};
use crate::command::CommandKind;
use crate::config::EngineConfig;
use crate::contract::{
    AttributeUpdate, Comment, Contract, NewContract, PoolState, Rejection, WorkStatus,
};
use crate::error::RoutingError;
use crate::registry::{ContractFilter, ContractRegistry, Delta};
use crate::snapshot::BoardSnapshot;

/// Contract counts per board section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub incoming_free: usize,
    pub incoming_addressed: usize,
    pub work: usize,
    pub outgoing_free: usize,
    pub outgoing_addressed: usize,
}

impl PoolSummary {
    pub fn total(&self) -> usize {
        self.incoming_free
            + self.incoming_addressed
            + self.work
            + self.outgoing_free
            + self.outgoing_addressed
    }

    fn record(&mut self, location: Location) {
        match location.routing_state() {
            RoutingState::IncomingFree | RoutingState::Claiming => self.incoming_free += 1,
            RoutingState::IncomingAddressed => self.incoming_addressed += 1,
            RoutingState::Work => self.work += 1,
            RoutingState::OutgoingFree => self.outgoing_free += 1,
            RoutingState::OutgoingAddressed => self.outgoing_addressed += 1,
        }
    }
}

/// Command/query surface of the routing engine.
///
/// Cheap to clone; clones share the registry and the claim coordinator.
#[derive(Debug, Clone)]
pub struct RoutingEngine {
    registry: Arc<ContractRegistry>,
    claims: ClaimCoordinator,
    config: EngineConfig,
}

impl RoutingEngine {
    /// An engine over an empty registry.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(ContractRegistry::new()),
            claims: ClaimCoordinator::new(),
            config,
        }
    }

    /// An engine seeded from a board snapshot.
    pub fn from_snapshot(
        config: EngineConfig,
        snapshot: BoardSnapshot,
    ) -> Result<Self, RoutingError> {
        let engine = Self::new(config);
        let loaded = engine.registry.hydrate(snapshot.contracts)?;
        tracing::info!(contracts = loaded, "hydrated registry from board snapshot");
        Ok(engine)
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn claims(&self) -> &ClaimCoordinator {
        &self.claims
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Intake and collaborators ─────────────────────────────────────

    /// Register a contract from intake.
    pub fn register(&self, new: NewContract) -> Result<Contract, RoutingError> {
        let contract = self.registry.register(new)?;
        tracing::info!(
            contract_id = %contract.id,
            location = %classify(&contract),
            "contract registered"
        );
        Ok(contract)
    }

    /// Apply a stage/SLA/work-status update from an external collaborator.
    pub fn update_attributes(
        &self,
        contract_id: &ContractId,
        update: &AttributeUpdate,
    ) -> Result<Contract, RoutingError> {
        self.registry.update_attributes(contract_id, update)
    }

    /// Post a comment on a contract.
    pub fn comment(
        &self,
        contract_id: &ContractId,
        author: &Actor,
        text: &str,
    ) -> Result<Comment, RoutingError> {
        self.registry.add_comment(contract_id, author.clone(), text)
    }

    pub fn comments(&self, contract_id: &ContractId) -> Result<Vec<Comment>, RoutingError> {
        self.registry.comments(contract_id)
    }

    // ── Take ─────────────────────────────────────────────────────────

    /// Claim a free incoming contract, wait out the confirmation delay, and
    /// commit.
    ///
    /// # Errors
    ///
    /// [`RoutingError::AlreadyClaiming`] if another take is in flight for
    /// the same id; [`RoutingError::InvalidTransition`] if the contract is
    /// not `INCOMING_FREE`; [`RoutingError::NotFound`].
    pub async fn take(
        &self,
        contract_id: &ContractId,
        actor: &Actor,
    ) -> Result<Contract, RoutingError> {
        let token = self.begin_take(contract_id, actor)?;
        tokio::time::sleep(self.config.claim_confirmation()).await;
        self.commit_take(token, actor)
    }

    /// Register a claim on a free incoming contract.
    ///
    /// `actor` is only used for logging; ownership is decided at commit.
    pub fn begin_take(
        &self,
        contract_id: &ContractId,
        actor: &Actor,
    ) -> Result<ClaimToken, RoutingError> {
        let result = self.registry.with_contract(contract_id, |current| {
            let stored = classify(current).routing_state();
            if stored != RoutingState::IncomingFree {
                return Err(invalid(current, CommandKind::Take, stored));
            }
            self.claims.begin_claim(contract_id)
        });
        if let Err(e) = &result {
            log_refusal(CommandKind::Take, contract_id, actor, e);
        }
        result
    }

    /// Commit a claim: `assigned_to = actor`, move to Work. The claim is
    /// released whatever the outcome.
    pub fn commit_take(&self, token: ClaimToken, actor: &Actor) -> Result<Contract, RoutingError> {
        let contract_id = token.contract_id().clone();
        let mut from = None;
        let result = self.claims.commit_claim(token, |id| {
            self.registry.apply(id, |current| {
                let location = classify(current);
                from = Some(location);
                plan_take(current, location.routing_state(), actor)
            })
        });
        observe(CommandKind::Take, &contract_id, actor, from, result)
    }

    /// Release a claim without committing. The contract is untouched.
    pub fn abort_take(&self, token: ClaimToken) {
        self.claims.abort_claim(token);
    }

    // ── Accept / Reject ──────────────────────────────────────────────

    /// Accept an incoming contract addressed to `actor`.
    pub fn accept(&self, contract_id: &ContractId, actor: &Actor) -> Result<Contract, RoutingError> {
        self.transition(CommandKind::Accept, contract_id, actor, |current, state| {
            plan_accept(current, state, actor)
        })
    }

    /// Refuse an incoming contract addressed to `actor`. The reason is
    /// stored verbatim on the contract and in the audit event.
    pub fn reject(
        &self,
        contract_id: &ContractId,
        actor: &Actor,
        reason: &str,
    ) -> Result<Contract, RoutingError> {
        self.transition(CommandKind::Reject, contract_id, actor, |current, state| {
            plan_reject(current, state, actor, reason)
        })
    }

    // ── Return / Send ────────────────────────────────────────────────

    /// Pull an outgoing contract back into work. Only the actor who
    /// dispatched it may do so.
    pub fn return_to_work(
        &self,
        contract_id: &ContractId,
        actor: &Actor,
    ) -> Result<Contract, RoutingError> {
        self.transition(CommandKind::Return, contract_id, actor, |current, state| {
            plan_return(current, state, actor)
        })
    }

    /// Dispatch a contract from work to Outgoing, addressed to `target`
    /// when one is given.
    pub fn send(
        &self,
        contract_id: &ContractId,
        actor: &Actor,
        target: Option<Actor>,
    ) -> Result<Contract, RoutingError> {
        self.transition(CommandKind::Send, contract_id, actor, |current, state| {
            plan_send(current, state, actor, target)
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, contract_id: &ContractId) -> Result<Contract, RoutingError> {
        self.registry.get(contract_id)
    }

    pub fn list(&self, filter: &ContractFilter) -> Vec<Contract> {
        self.registry.list(filter)
    }

    /// Contracts in `pool`, optionally narrowed to one sub-pool.
    pub fn list_by_pool(&self, pool: Pool, sub_pool: Option<SubPool>) -> Vec<Contract> {
        let mut filter = ContractFilter::in_pool(pool);
        filter.sub_pool = sub_pool;
        self.registry.list(&filter)
    }

    /// Audit events for a contract, oldest first.
    pub fn history(&self, contract_id: &ContractId) -> Result<Vec<AuditEvent>, RoutingError> {
        self.registry.history(contract_id)
    }

    /// The contract's stored location.
    pub fn location_of(&self, contract_id: &ContractId) -> Result<Location, RoutingError> {
        self.registry
            .with_contract(contract_id, |current| Ok(classify(current)))
    }

    /// The contract's routing state, reporting `CLAIMING` while a take is
    /// in flight.
    pub fn state_of(&self, contract_id: &ContractId) -> Result<RoutingState, RoutingError> {
        self.registry
            .with_contract(contract_id, |current| Ok(self.state_for(current)))
    }

    /// Counts per board section. In-flight claims count as free incoming.
    pub fn pool_summary(&self) -> PoolSummary {
        let mut summary = PoolSummary::default();
        for contract in self.registry.list(&ContractFilter::all()) {
            summary.record(classify(&contract));
        }
        summary
    }

    // ── Internals ────────────────────────────────────────────────────

    fn state_for(&self, contract: &Contract) -> RoutingState {
        let stored = classify(contract).routing_state();
        if stored == RoutingState::IncomingFree && self.claims.is_claiming(&contract.id) {
            RoutingState::Claiming
        } else {
            stored
        }
    }

    fn transition(
        &self,
        command: CommandKind,
        contract_id: &ContractId,
        actor: &Actor,
        plan: impl FnOnce(&Contract, RoutingState) -> Result<Delta, RoutingError>,
    ) -> Result<Contract, RoutingError> {
        let mut from = None;
        let result = self.registry.apply(contract_id, |current| {
            from = Some(classify(current));
            plan(current, self.state_for(current))
        });
        observe(command, contract_id, actor, from, result)
    }
}

// ─── Rule table ──────────────────────────────────────────────────────

fn invalid(current: &Contract, command: CommandKind, state: RoutingState) -> RoutingError {
    RoutingError::InvalidTransition {
        contract_id: current.id.clone(),
        command,
        state,
    }
}

fn require_holder(
    current: &Contract,
    holder: Option<&Actor>,
    actor: &Actor,
    command: CommandKind,
) -> Result<(), RoutingError> {
    match holder {
        Some(h) if h.is(&actor.name) => Ok(()),
        _ => Err(RoutingError::NotAssignedToActor {
            contract_id: current.id.clone(),
            actor: actor.name.clone(),
            command,
        }),
    }
}

fn delta(command: CommandKind, actor: &Actor, next: Contract, detail: Option<String>) -> Delta {
    Delta {
        command,
        actor: actor.clone(),
        next,
        detail,
    }
}

fn plan_take(current: &Contract, state: RoutingState, actor: &Actor) -> Result<Delta, RoutingError> {
    if state != RoutingState::IncomingFree {
        return Err(invalid(current, CommandKind::Take, state));
    }
    let mut next = current.clone();
    next.pool_state = PoolState::Work;
    next.assigned_to = Some(actor.clone());
    next.work_status = Some(WorkStatus::Active);
    Ok(delta(CommandKind::Take, actor, next, None))
}

fn plan_accept(
    current: &Contract,
    state: RoutingState,
    actor: &Actor,
) -> Result<Delta, RoutingError> {
    if state != RoutingState::IncomingAddressed {
        return Err(invalid(current, CommandKind::Accept, state));
    }
    require_holder(current, current.assigned_to.as_ref(), actor, CommandKind::Accept)?;
    let mut next = current.clone();
    next.pool_state = PoolState::Work;
    next.work_status = Some(WorkStatus::Active);
    Ok(delta(CommandKind::Accept, actor, next, None))
}

fn plan_reject(
    current: &Contract,
    state: RoutingState,
    actor: &Actor,
    reason: &str,
) -> Result<Delta, RoutingError> {
    if state != RoutingState::IncomingAddressed {
        return Err(invalid(current, CommandKind::Reject, state));
    }
    require_holder(current, current.assigned_to.as_ref(), actor, CommandKind::Reject)?;
    if reason.trim().is_empty() {
        return Err(RoutingError::EmptyReason(current.id.clone()));
    }
    let mut next = current.clone();
    next.pool_state = PoolState::Outgoing;
    next.assigned_to = None;
    next.dispatched_by = Some(actor.clone());
    next.work_status = None;
    next.rejection = Some(Rejection {
        by: actor.clone(),
        reason: reason.to_string(),
        at: Timestamp::now(),
    });
    Ok(delta(CommandKind::Reject, actor, next, Some(reason.to_string())))
}

fn plan_return(
    current: &Contract,
    state: RoutingState,
    actor: &Actor,
) -> Result<Delta, RoutingError> {
    if !state.is_outgoing() {
        return Err(invalid(current, CommandKind::Return, state));
    }
    require_holder(current, current.dispatched_by.as_ref(), actor, CommandKind::Return)?;
    let mut next = current.clone();
    next.pool_state = PoolState::Work;
    next.assigned_to = Some(actor.clone());
    next.dispatched_by = None;
    next.rejection = None;
    next.work_status = Some(WorkStatus::Active);
    Ok(delta(CommandKind::Return, actor, next, None))
}

fn plan_send(
    current: &Contract,
    state: RoutingState,
    actor: &Actor,
    target: Option<Actor>,
) -> Result<Delta, RoutingError> {
    if state != RoutingState::Work {
        return Err(invalid(current, CommandKind::Send, state));
    }
    require_holder(current, current.assigned_to.as_ref(), actor, CommandKind::Send)?;
    let mut next = current.clone();
    next.pool_state = PoolState::Outgoing;
    next.assigned_to = target;
    next.dispatched_by = Some(actor.clone());
    next.work_status = None;
    Ok(delta(CommandKind::Send, actor, next, None))
}

// ─── Logging ─────────────────────────────────────────────────────────

fn log_refusal(command: CommandKind, contract_id: &ContractId, actor: &Actor, error: &RoutingError) {
    tracing::warn!(
        contract_id = %contract_id,
        command = %command,
        actor = %actor.name,
        kind = %error.kind(),
        error = %error,
        "routing command refused"
    );
}

fn observe(
    command: CommandKind,
    contract_id: &ContractId,
    actor: &Actor,
    from: Option<Location>,
    result: Result<Contract, RoutingError>,
) -> Result<Contract, RoutingError> {
    match &result {
        Ok(contract) => tracing::info!(
            contract_id = %contract_id,
            command = %command,
            actor = %actor.name,
            from = %from.map_or_else(String::new, |l| l.to_string()),
            to = %classify(contract),
            "routing command committed"
        ),
        Err(e) => log_refusal(command, contract_id, actor, e),
    }
    result
}
