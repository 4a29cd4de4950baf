//! # Contract Registry
//!
//! Sole owner of contract state. All mutation passes through it.
//!
//! ## Locking
//!
//! Each contract lives in its own slot behind a `parking_lot::Mutex`. The
//! outer `RwLock` only guards the id → slot index and is held just long
//! enough to clone the slot handle, so operations on different ids never
//! wait on each other. Every read-modify-write on a contract runs under its
//! slot lock, and [`ContractRegistry::apply`] appends the audit event in
//! that same critical section: a transition either writes both the new
//! state and its event, or neither.
//!
//! Locks are never held across `.await` points.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use lway_core::{Actor, ActorName, ContractId, Timestamp};

use crate::audit::{AuditEntry, AuditEvent, AuditLog};
use crate::classifier::{classify, Pool, SubPool};
use crate::command::CommandKind;
use crate::contract::{AttributeUpdate, Comment, Contract, NewContract, Stage};
use crate::error::RoutingError;

/// A proposed transition, produced by the engine from the current state.
#[derive(Debug, Clone)]
pub struct Delta {
    /// The command being committed.
    pub command: CommandKind,
    /// Who issued it.
    pub actor: Actor,
    /// The contract after the transition.
    pub next: Contract,
    /// Audit detail (the rejection reason).
    pub detail: Option<String>,
}

/// Query filter for [`ContractRegistry::list`]. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractFilter {
    pub pool: Option<Pool>,
    pub sub_pool: Option<SubPool>,
    pub assignee: Option<ActorName>,
    pub stage: Option<Stage>,
}

impl ContractFilter {
    /// Match every contract.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match contracts in `pool`.
    pub fn in_pool(pool: Pool) -> Self {
        Self {
            pool: Some(pool),
            ..Self::default()
        }
    }

    pub fn with_sub_pool(mut self, sub_pool: SubPool) -> Self {
        self.sub_pool = Some(sub_pool);
        self
    }

    pub fn assigned_to(mut self, actor: ActorName) -> Self {
        self.assignee = Some(actor);
        self
    }

    pub fn at_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Whether `contract` passes the filter.
    pub fn matches(&self, contract: &Contract) -> bool {
        let location = classify(contract);
        if self.pool.is_some_and(|p| p != location.pool) {
            return false;
        }
        if self.sub_pool.is_some_and(|s| s != location.sub_pool) {
            return false;
        }
        if let Some(assignee) = &self.assignee {
            let holds = contract
                .assigned_to
                .as_ref()
                .is_some_and(|a| a.is(assignee));
            if !holds {
                return false;
            }
        }
        if self.stage.is_some_and(|s| s != contract.stage) {
            return false;
        }
        true
    }
}

#[derive(Debug)]
struct Record {
    contract: Contract,
    comments: Vec<Comment>,
}

type Slot = Arc<Mutex<Record>>;

/// In-memory contract registry with per-contract serialization.
#[derive(Debug, Default)]
pub struct ContractRegistry {
    slots: RwLock<BTreeMap<ContractId, Slot>>,
    audit: AuditLog,
}

impl ContractRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, contract_id: &ContractId) -> Result<Slot, RoutingError> {
        self.slots
            .read()
            .get(contract_id)
            .cloned()
            .ok_or_else(|| RoutingError::NotFound(contract_id.clone()))
    }

    fn new_slot(contract: Contract) -> Slot {
        Arc::new(Mutex::new(Record {
            contract,
            comments: Vec::new(),
        }))
    }

    // ── Intake ───────────────────────────────────────────────────────

    /// Register a contract delivered by intake. It lands in Incoming.
    ///
    /// # Errors
    ///
    /// [`RoutingError::AlreadyExists`] for a duplicate id,
    /// [`RoutingError::InvalidRecord`] if the record breaks an invariant.
    pub fn register(&self, new: NewContract) -> Result<Contract, RoutingError> {
        let contract = new.into_contract();
        contract.validate()?;
        let mut slots = self.slots.write();
        if slots.contains_key(&contract.id) {
            return Err(RoutingError::AlreadyExists(contract.id));
        }
        slots.insert(contract.id.clone(), Self::new_slot(contract.clone()));
        Ok(contract)
    }

    /// Load contracts in any pool from a snapshot. All-or-nothing: if any
    /// record is invalid or duplicated nothing is inserted.
    ///
    /// Hydration is not a transition and writes no audit events.
    pub fn hydrate(&self, contracts: Vec<Contract>) -> Result<usize, RoutingError> {
        let mut seen = BTreeSet::new();
        for contract in &contracts {
            contract.validate()?;
            if !seen.insert(contract.id.clone()) {
                return Err(RoutingError::AlreadyExists(contract.id.clone()));
            }
        }

        let mut slots = self.slots.write();
        if let Some(existing) = contracts.iter().find(|c| slots.contains_key(&c.id)) {
            return Err(RoutingError::AlreadyExists(existing.id.clone()));
        }
        let count = contracts.len();
        for contract in contracts {
            slots.insert(contract.id.clone(), Self::new_slot(contract));
        }
        Ok(count)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current state of a contract.
    pub fn get(&self, contract_id: &ContractId) -> Result<Contract, RoutingError> {
        Ok(self.slot(contract_id)?.lock().contract.clone())
    }

    /// Contracts passing `filter`, ordered by id.
    pub fn list(&self, filter: &ContractFilter) -> Vec<Contract> {
        let slots: Vec<Slot> = self.slots.read().values().cloned().collect();
        slots
            .iter()
            .map(|slot| slot.lock().contract.clone())
            .filter(|c| filter.matches(c))
            .collect()
    }

    /// Audit events for a registered contract, oldest first.
    pub fn history(&self, contract_id: &ContractId) -> Result<Vec<AuditEvent>, RoutingError> {
        self.slot(contract_id)?;
        Ok(self.audit.history(contract_id))
    }

    /// The underlying audit log.
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Run `inspect` against the contract while holding its slot lock.
    ///
    /// Used to make a decision that must not interleave with a transition
    /// on the same id.
    pub fn with_contract<R>(
        &self,
        contract_id: &ContractId,
        inspect: impl FnOnce(&Contract) -> Result<R, RoutingError>,
    ) -> Result<R, RoutingError> {
        let slot = self.slot(contract_id)?;
        let record = slot.lock();
        inspect(&record.contract)
    }

    /// Atomically plan and commit a transition.
    ///
    /// `plan` sees the current contract and either proposes a [`Delta`] or
    /// refuses. On success the new state is written and one audit event is
    /// appended under the same lock. On any error nothing changes.
    pub fn apply(
        &self,
        contract_id: &ContractId,
        plan: impl FnOnce(&Contract) -> Result<Delta, RoutingError>,
    ) -> Result<Contract, RoutingError> {
        let slot = self.slot(contract_id)?;
        let mut record = slot.lock();

        let delta = plan(&record.contract)?;
        if delta.next.id != record.contract.id {
            return Err(RoutingError::invalid_record(
                contract_id,
                "a transition cannot change the contract id",
            ));
        }
        delta.next.validate()?;

        let from = classify(&record.contract);
        let to = classify(&delta.next);
        self.audit.append(
            contract_id,
            AuditEntry {
                command: delta.command,
                actor: delta.actor,
                from,
                to,
                detail: delta.detail,
            },
        );
        record.contract = delta.next;
        Ok(record.contract.clone())
    }

    /// Apply a collaborator attribute update. Not a transition: no audit
    /// event is written.
    pub fn update_attributes(
        &self,
        contract_id: &ContractId,
        update: &AttributeUpdate,
    ) -> Result<Contract, RoutingError> {
        let slot = self.slot(contract_id)?;
        let mut record = slot.lock();
        let next = update.applied_to(&record.contract);
        next.validate()?;
        record.contract = next;
        Ok(record.contract.clone())
    }

    /// Append a comment to the contract's thread.
    pub fn add_comment(
        &self,
        contract_id: &ContractId,
        author: Actor,
        text: &str,
    ) -> Result<Comment, RoutingError> {
        let slot = self.slot(contract_id)?;
        if text.trim().is_empty() {
            return Err(RoutingError::EmptyComment(contract_id.clone()));
        }
        let comment = Comment {
            author,
            text: text.trim().to_string(),
            at: Timestamp::now(),
        };
        slot.lock().comments.push(comment.clone());
        Ok(comment)
    }

    /// Comments on a contract, oldest first.
    pub fn comments(&self, contract_id: &ContractId) -> Result<Vec<Comment>, RoutingError> {
        Ok(self.slot(contract_id)?.lock().comments.clone())
    }
}
