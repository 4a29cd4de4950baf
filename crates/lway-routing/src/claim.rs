//! # Claim Coordinator
//!
//! Guarantees at most one in-flight take per contract id.
//!
//! `begin_claim` is a single check-and-set on the in-flight set: exactly one
//! caller gets a [`ClaimToken`], every other caller gets
//! [`RoutingError::AlreadyClaiming`] synchronously. The token is a scoped
//! acquisition. It releases its id when committed, when aborted, and when
//! dropped for any other reason (a cancelled future, an early return, a
//! panic), so the set can never leak an entry.
//!
//! The coordinator never writes the registry. While a token exists the
//! contract's committed assignment is still empty, so the in-flight set and
//! the registry never name different owners for the same id.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use lway_core::ContractId;

use crate::error::RoutingError;

type InFlight = Arc<Mutex<HashSet<ContractId>>>;

/// Registry of contract ids with a take in flight.
#[derive(Debug, Clone, Default)]
pub struct ClaimCoordinator {
    in_flight: InFlight,
}

impl ClaimCoordinator {
    /// Create a coordinator with an empty in-flight set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a claim on `contract_id`.
    ///
    /// # Errors
    ///
    /// [`RoutingError::AlreadyClaiming`] if a claim on the same id is in
    /// flight.
    pub fn begin_claim(&self, contract_id: &ContractId) -> Result<ClaimToken, RoutingError> {
        if !self.in_flight.lock().insert(contract_id.clone()) {
            tracing::debug!(contract_id = %contract_id, "claim refused: already in flight");
            return Err(RoutingError::AlreadyClaiming(contract_id.clone()));
        }
        tracing::debug!(contract_id = %contract_id, "claim begun");
        Ok(ClaimToken {
            contract_id: contract_id.clone(),
            in_flight: Arc::clone(&self.in_flight),
            released: false,
        })
    }

    /// Run `finalize` for the token's contract, then release the claim.
    ///
    /// The claim is released whether `finalize` succeeds, fails, or panics.
    pub fn commit_claim<T>(
        &self,
        token: ClaimToken,
        finalize: impl FnOnce(&ContractId) -> Result<T, RoutingError>,
    ) -> Result<T, RoutingError> {
        let mut token = token;
        let outcome = finalize(&token.contract_id);
        tracing::debug!(
            contract_id = %token.contract_id,
            committed = outcome.is_ok(),
            "claim finished"
        );
        token.release();
        outcome
    }

    /// Release a claim without committing it.
    pub fn abort_claim(&self, token: ClaimToken) {
        let mut token = token;
        tracing::debug!(contract_id = %token.contract_id, "claim aborted");
        token.release();
    }

    /// Whether a claim on `contract_id` is in flight.
    pub fn is_claiming(&self, contract_id: &ContractId) -> bool {
        self.in_flight.lock().contains(contract_id)
    }

    /// Number of claims in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }
}

/// Proof of an in-flight claim on one contract.
///
/// Not `Clone`: there is exactly one token per in-flight id.
#[derive(Debug)]
#[must_use = "dropping a claim token releases the claim immediately"]
pub struct ClaimToken {
    contract_id: ContractId,
    in_flight: InFlight,
    released: bool,
}

impl ClaimToken {
    /// The contract this token claims.
    pub fn contract_id(&self) -> &ContractId {
        &self.contract_id
    }

    /// Remove the id from the in-flight set. Idempotent.
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.in_flight.lock().remove(&self.contract_id);
        self.released = true;
    }
}

impl Drop for ClaimToken {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!(contract_id = %self.contract_id, "claim token dropped; releasing");
        }
        self.release();
    }
}
