//! # Routing Errors
//!
//! Every command terminates in either a committed state change or one of
//! these errors. All are local and recoverable; none leaves a partial
//! mutation behind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lway_core::{ActorName, ContractId};

use crate::classifier::RoutingState;
use crate::command::CommandKind;

/// Errors returned by the registry, claim coordinator, and transition engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// No contract with this id is registered.
    #[error("contract {0} not found")]
    NotFound(ContractId),

    /// The command is not legal from the contract's current state.
    #[error("{command} is not valid for contract {contract_id} in state {state}")]
    InvalidTransition {
        /// The contract the command targeted.
        contract_id: ContractId,
        /// The rejected command.
        command: CommandKind,
        /// The contract's state when the command arrived.
        state: RoutingState,
    },

    /// The acting actor does not hold responsibility for the contract.
    #[error("{actor} is not responsible for contract {contract_id} and cannot {command}")]
    NotAssignedToActor {
        /// The contract the command targeted.
        contract_id: ContractId,
        /// The actor who issued the command.
        actor: ActorName,
        /// The rejected command.
        command: CommandKind,
    },

    /// Reject was issued with an empty or whitespace-only reason.
    #[error("rejecting contract {0} requires a non-empty reason")]
    EmptyReason(ContractId),

    /// Another take for the same contract is already in flight.
    #[error("a claim on contract {0} is already in flight")]
    AlreadyClaiming(ContractId),

    /// Intake or hydration tried to register a duplicate id.
    #[error("contract {0} already exists")]
    AlreadyExists(ContractId),

    /// A record violates a data-model invariant.
    #[error("invalid contract record {contract_id}: {reason}")]
    InvalidRecord {
        /// The offending contract.
        contract_id: ContractId,
        /// Which invariant was violated.
        reason: String,
    },

    /// A comment was posted with blank text.
    #[error("comment on contract {0} must not be empty")]
    EmptyComment(ContractId),
}

impl RoutingError {
    /// Stable classification for the presentation layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::NotAssignedToActor { .. } => ErrorKind::NotAssignedToActor,
            Self::EmptyReason(_) => ErrorKind::EmptyReason,
            Self::AlreadyClaiming(_) => ErrorKind::AlreadyClaiming,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::InvalidRecord { .. } => ErrorKind::InvalidRecord,
            Self::EmptyComment(_) => ErrorKind::EmptyComment,
        }
    }

    pub(crate) fn invalid_record(contract_id: &ContractId, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            contract_id: contract_id.clone(),
            reason: reason.into(),
        }
    }
}

/// Error classification without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidTransition,
    NotAssignedToActor,
    EmptyReason,
    AlreadyClaiming,
    AlreadyExists,
    InvalidRecord,
    EmptyComment,
}

impl ErrorKind {
    /// The canonical name of this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::NotAssignedToActor => "NOT_ASSIGNED_TO_ACTOR",
            Self::EmptyReason => "EMPTY_REASON",
            Self::AlreadyClaiming => "ALREADY_CLAIMING",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::InvalidRecord => "INVALID_RECORD",
            Self::EmptyComment => "EMPTY_COMMENT",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
