//! # Audit Log
//!
//! Append-only record of committed transitions. There is no mutation or
//! deletion API. Events are appended only by the registry, inside the same
//! per-contract critical section that writes the new contract state.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use lway_core::{Actor, AuditEventId, ContractId, Timestamp};

use crate::classifier::Location;
use crate::command::CommandKind;

/// One committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: AuditEventId,
    /// Global commit order across all contracts, starting at 1.
    pub sequence: u64,
    /// The contract that transitioned.
    pub contract_id: ContractId,
    /// The command that was applied.
    pub command: CommandKind,
    /// Who issued it.
    pub actor: Actor,
    /// When it was committed.
    pub timestamp: Timestamp,
    /// Location before the transition.
    pub from: Location,
    /// Location after the transition.
    pub to: Location,
    /// Rejection reason, when the command was a reject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The part of an event the caller supplies; id, sequence, and timestamp
/// are assigned on append.
#[derive(Debug, Clone)]
pub(crate) struct AuditEntry {
    pub command: CommandKind,
    pub actor: Actor,
    pub from: Location,
    pub to: Location,
    pub detail: Option<String>,
}

#[derive(Debug, Default)]
struct AuditState {
    last_sequence: u64,
    by_contract: HashMap<ContractId, Vec<AuditEvent>>,
}

/// Append-only audit trail, indexed by contract.
#[derive(Debug, Default)]
pub struct AuditLog {
    state: RwLock<AuditState>,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&self, contract_id: &ContractId, entry: AuditEntry) -> AuditEvent {
        let mut state = self.state.write();
        state.last_sequence += 1;
        let event = AuditEvent {
            id: AuditEventId::new(),
            sequence: state.last_sequence,
            contract_id: contract_id.clone(),
            command: entry.command,
            actor: entry.actor,
            timestamp: Timestamp::now(),
            from: entry.from,
            to: entry.to,
            detail: entry.detail,
        };
        state
            .by_contract
            .entry(contract_id.clone())
            .or_default()
            .push(event.clone());
        event
    }

    /// Events for one contract, oldest first. Empty for unknown ids.
    pub fn history(&self, contract_id: &ContractId) -> Vec<AuditEvent> {
        self.state
            .read()
            .by_contract
            .get(contract_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every event in commit order.
    pub fn all(&self) -> Vec<AuditEvent> {
        let state = self.state.read();
        let mut events: Vec<AuditEvent> = state.by_contract.values().flatten().cloned().collect();
        events.sort_by_key(|e| e.sequence);
        events
    }

    /// Total number of events.
    pub fn len(&self) -> usize {
        self.state.read().by_contract.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Pool, SubPool};
    use lway_core::ActorName;

    fn cid(s: &str) -> ContractId {
        ContractId::new(s).unwrap()
    }

    fn entry(command: CommandKind, detail: Option<&str>) -> AuditEntry {
        AuditEntry {
            command,
            actor: Actor::new(ActorName::new("Ivan").unwrap(), "Manager"),
            from: Location {
                pool: Pool::Incoming,
                sub_pool: SubPool::Free,
            },
            to: Location {
                pool: Pool::Work,
                sub_pool: SubPool::Free,
            },
            detail: detail.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_log() {
        let log = AuditLog::new();
        assert!(log.is_empty());
        assert!(log.history(&cid("C-001")).is_empty());
    }

    #[test]
    fn test_history_is_oldest_first() {
        let log = AuditLog::new();
        log.append(&cid("C-001"), entry(CommandKind::Take, None));
        log.append(&cid("C-001"), entry(CommandKind::Send, None));
        log.append(&cid("C-001"), entry(CommandKind::Return, None));
        let commands: Vec<_> = log
            .history(&cid("C-001"))
            .iter()
            .map(|e| e.command)
            .collect();
        assert_eq!(
            commands,
            vec![CommandKind::Take, CommandKind::Send, CommandKind::Return]
        );
    }

    #[test]
    fn test_sequence_is_global_and_monotonic() {
        let log = AuditLog::new();
        let a = log.append(&cid("C-001"), entry(CommandKind::Take, None));
        let b = log.append(&cid("C-002"), entry(CommandKind::Take, None));
        let c = log.append(&cid("C-001"), entry(CommandKind::Send, None));
        assert_eq!((a.sequence, b.sequence, c.sequence), (1, 2, 3));
        let all: Vec<u64> = log.all().iter().map(|e| e.sequence).collect();
        assert_eq!(all, vec![1, 2, 3]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_detail_is_kept_verbatim() {
        let log = AuditLog::new();
        let event = log.append(
            &cid("C-003"),
            entry(CommandKind::Reject, Some("  price too high ")),
        );
        assert_eq!(event.detail.as_deref(), Some("  price too high "));
    }

    #[test]
    fn test_histories_are_isolated() {
        let log = AuditLog::new();
        log.append(&cid("C-001"), entry(CommandKind::Take, None));
        log.append(&cid("C-002"), entry(CommandKind::Accept, None));
        assert_eq!(log.history(&cid("C-001")).len(), 1);
        assert_eq!(log.history(&cid("C-002"))[0].command, CommandKind::Accept);
    }
}
