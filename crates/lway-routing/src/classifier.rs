//! # Pool Classifier
//!
//! Pure mapping from a contract's stored fields to where it sits on the
//! board.
//!
//! ```text
//!             Take                            Accept
//!  IncomingFree ──▶ Claiming ──▶ Work ◀────────────── IncomingAddressed
//!                                │ ▲                      │
//!                          Send  │ │ Return               │ Reject
//!                                ▼ │                      ▼
//!                  OutgoingFree / OutgoingAddressed ◀─────┘
//! ```
//!
//! `Claiming` is never stored. It is reported by the engine while a take
//! is in flight for a contract whose stored location is `IncomingFree`.

use serde::{Deserialize, Serialize};

use crate::contract::{Contract, PoolState};

/// Macro-location of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    Incoming,
    Work,
    Outgoing,
}

impl Pool {
    pub const ALL: [Pool; 3] = [Self::Incoming, Self::Work, Self::Outgoing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "INCOMING",
            Self::Work => "WORK",
            Self::Outgoing => "OUTGOING",
        }
    }
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a contract has a specific target actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubPool {
    Free,
    Addressed,
}

impl SubPool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Addressed => "ADDRESSED",
        }
    }
}

impl std::fmt::Display for SubPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (pool, sub-pool) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub pool: Pool,
    pub sub_pool: SubPool,
}

impl Location {
    /// The routing state for this location, ignoring in-flight claims.
    pub fn routing_state(&self) -> RoutingState {
        match (self.pool, self.sub_pool) {
            (Pool::Incoming, SubPool::Free) => RoutingState::IncomingFree,
            (Pool::Incoming, SubPool::Addressed) => RoutingState::IncomingAddressed,
            (Pool::Work, _) => RoutingState::Work,
            (Pool::Outgoing, SubPool::Free) => RoutingState::OutgoingFree,
            (Pool::Outgoing, SubPool::Addressed) => RoutingState::OutgoingAddressed,
        }
    }

    /// Status label shown on the contract detail panel.
    pub fn display_status(&self) -> DisplayStatus {
        match self.pool {
            Pool::Incoming => DisplayStatus::Awaiting,
            Pool::Work => DisplayStatus::InWork,
            Pool::Outgoing => DisplayStatus::ReadyToSend,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.pool {
            Pool::Work => write!(f, "{}", self.pool),
            _ => write!(f, "{}/{}", self.pool, self.sub_pool),
        }
    }
}

/// Per-contract state of the routing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingState {
    /// Unclaimed, open to any actor.
    IncomingFree,
    /// Targeted at a specific actor, awaiting accept or reject.
    IncomingAddressed,
    /// A take is in flight (transient, never stored).
    Claiming,
    /// Held by a responsible actor.
    Work,
    /// Dispatched without a target.
    OutgoingFree,
    /// Dispatched to a specific actor.
    OutgoingAddressed,
}

impl RoutingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncomingFree => "INCOMING_FREE",
            Self::IncomingAddressed => "INCOMING_ADDRESSED",
            Self::Claiming => "CLAIMING",
            Self::Work => "WORK",
            Self::OutgoingFree => "OUTGOING_FREE",
            Self::OutgoingAddressed => "OUTGOING_ADDRESSED",
        }
    }

    /// Whether this state is in the Outgoing pool.
    pub fn is_outgoing(&self) -> bool {
        matches!(self, Self::OutgoingFree | Self::OutgoingAddressed)
    }
}

impl std::fmt::Display for RoutingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse status label derived from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Awaiting,
    InWork,
    ReadyToSend,
}

impl DisplayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Awaiting => "awaiting",
            Self::InWork => "in work",
            Self::ReadyToSend => "ready to send",
        }
    }
}

/// Classify a contract into its pool and sub-pool.
///
/// Total over all contracts: Work is always reported as `Free`, and
/// Incoming/Outgoing are `Addressed` exactly when `assigned_to` is set.
pub fn classify(contract: &Contract) -> Location {
    let pool = match contract.pool_state {
        PoolState::Incoming => Pool::Incoming,
        PoolState::Work => Pool::Work,
        PoolState::Outgoing => Pool::Outgoing,
    };
    let sub_pool = match (pool, &contract.assigned_to) {
        (Pool::Incoming | Pool::Outgoing, Some(_)) => SubPool::Addressed,
        _ => SubPool::Free,
    };
    Location { pool, sub_pool }
}
