//! # lway-routing — Contract Routing and Claim Assignment
//!
//! Moves contracts between departments. A contract sits in one of three
//! pools (Incoming, Work, Outgoing) and, outside Work, in one of two
//! sub-pools (Free, Addressed). Five commands move it: Take, Accept,
//! Reject, Return and Send.
//!
//! ## Components
//!
//! - **Registry** (`registry.rs`): sole owner of contract state, with a
//!   lock per contract. Writes state and audit event in one critical
//!   section.
//!
//! - **Claim Coordinator** (`claim.rs`): at most one in-flight take per
//!   contract. Claims are scoped tokens released on commit, abort or drop.
//!
//! - **Transition Engine** (`engine.rs`): the rule table for the five
//!   commands, plus read queries.
//!
//! - **Pool Classifier** (`classifier.rs`): pure mapping from stored fields
//!   to pool, sub-pool, routing state and display status.
//!
//! - **Audit Log** (`audit.rs`): append-only record of every committed
//!   transition.
//!
//! ## Design
//!
//! Actors are explicit arguments; there is no ambient current user.
//! Every command returns either the updated contract or a
//! [`RoutingError`], and a refused command changes nothing.

pub mod audit;
pub mod claim;
pub mod classifier;
pub mod command;
pub mod config;
pub mod contract;
pub mod engine;
pub mod error;
pub mod registry;
pub mod snapshot;

// ─── Data model re-exports ──────────────────────────────────────────

pub use contract::{
    AttributeUpdate, Comment, Contract, Customer, NewContract, PoolState, Rejection, Stage,
    TimeRemaining, WorkStatus,
};

// ─── Classification re-exports ──────────────────────────────────────

pub use classifier::{classify, DisplayStatus, Location, Pool, RoutingState, SubPool};

// ─── Engine re-exports ──────────────────────────────────────────────

pub use audit::{AuditEvent, AuditLog};
pub use claim::{ClaimCoordinator, ClaimToken};
pub use command::CommandKind;
pub use config::{EngineConfig, CLAIM_CONFIRMATION_ENV, DEFAULT_CLAIM_CONFIRMATION_MS};
pub use engine::{PoolSummary, RoutingEngine};
pub use error::{ErrorKind, RoutingError};
pub use registry::{ContractFilter, ContractRegistry, Delta};
pub use snapshot::BoardSnapshot;
