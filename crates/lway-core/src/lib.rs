//! # lway-core — Foundational Types for LibriumWay Routing
//!
//! Leaf crate of the LibriumWay workspace. Every other crate depends on
//! `lway-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `ContractId`, `ActorName` and
//!    `AuditEventId` are distinct types with validated constructors. A
//!    contract id cannot be passed where an actor name is expected.
//!
//! 2. **Explicit actors.** There is no ambient "current user". Every
//!    command carries an [`Actor`] (`name` + `department`) supplied by the
//!    caller.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] is always UTC, truncated to
//!    seconds, rendered with a `Z` suffix.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lway-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::LwayError;
pub use identity::{Actor, ActorName, AuditEventId, ContractId};
pub use temporal::Timestamp;
