//! # Contract Data Model
//!
//! The central entity of the routing pipeline and the records that hang
//! off it (customer, rejection, comments).
//!
//! ## Location is derived
//!
//! A contract stores only a [`PoolState`] tag plus its assignment fields.
//! Pool and sub-pool are computed by [`crate::classify`] from those fields,
//! so the two can never diverge. Nothing is ever derived from the shape of
//! the contract id.
//!
//! ## Stage is independent
//!
//! [`Stage`] tracks fulfillment progress and is owned by an external
//! stage-advancement process. No routing command reads or writes it.

use serde::{Deserialize, Serialize};

use lway_core::{Actor, ContractId, Timestamp};

use crate::error::RoutingError;

// ─── Stage ───────────────────────────────────────────────────────────

/// Fulfillment pipeline position, supplier search through delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Stage {
    /// Looking for a supplier.
    SupplierSearch = 1,
    /// Negotiating price with the supplier.
    PriceNegotiation = 2,
    /// Customer approving product samples.
    SampleApproval = 3,
    /// Arranging freight.
    Logistics = 4,
    /// Customs clearance.
    Customs = 5,
    /// Final delivery to the customer.
    Delivery = 6,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 6] = [
        Self::SupplierSearch,
        Self::PriceNegotiation,
        Self::SampleApproval,
        Self::Logistics,
        Self::Customs,
        Self::Delivery,
    ];

    /// Position in the pipeline (1-6).
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// The snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SupplierSearch => "supplier_search",
            Self::PriceNegotiation => "price_negotiation",
            Self::SampleApproval => "sample_approval",
            Self::Logistics => "logistics",
            Self::Customs => "customs",
            Self::Delivery => "delivery",
        }
    }

    /// Human-readable label for board rendering.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SupplierSearch => "Supplier search",
            Self::PriceNegotiation => "Price negotiation",
            Self::SampleApproval => "Sample approval",
            Self::Logistics => "Logistics arrangement",
            Self::Customs => "Customs clearance",
            Self::Delivery => "Delivery",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Small value types ───────────────────────────────────────────────

/// Display/priority hint for contracts in the Work pool. Never gates a
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Active,
    Pending,
}

/// Opaque SLA value (e.g. `"5 days"`). Decremented by an external clock;
/// the engine only stores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeRemaining(pub String);

impl TimeRemaining {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The customer a contract is fulfilled for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer display name.
    pub name: String,
    /// First contract with this customer.
    pub is_new: bool,
    /// Number of previously completed contracts. Absent or zero for new
    /// customers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_contracts: Option<u32>,
}

impl Customer {
    /// A first-time customer.
    pub fn new_customer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_new: true,
            completed_contracts: None,
        }
    }

    /// A returning customer with `completed` finished contracts.
    pub fn returning(name: impl Into<String>, completed: u32) -> Self {
        Self {
            name: name.into(),
            is_new: false,
            completed_contracts: Some(completed),
        }
    }
}

/// Why and by whom an addressed contract was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// The actor who refused the contract.
    pub by: Actor,
    /// The reason exactly as given.
    pub reason: String,
    /// When the rejection was committed.
    pub at: Timestamp,
}

/// A comment on a contract's discussion thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: Actor,
    pub text: String,
    pub at: Timestamp,
}

// ─── Pool state ──────────────────────────────────────────────────────

/// Persisted macro-location tag. The only stored location field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    /// Never claimed and not yet dispatched.
    Incoming,
    /// Claimed or accepted and not yet sent onward.
    Work,
    /// Sent onward (or refused back toward the sender).
    Outgoing,
}

// ─── Contract ────────────────────────────────────────────────────────

/// A trade contract moving through the routing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Unique, immutable identifier.
    pub id: ContractId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Fulfillment progress, independent of pool location.
    pub stage: Stage,
    /// Only meaningful (and only allowed) while in the Work pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_status: Option<WorkStatus>,
    pub time_remaining: TimeRemaining,
    pub customer: Customer,
    /// The party who placed the contract into Incoming.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_from: Option<Actor>,
    /// The party currently responsible (Work) or targeted (Incoming/Outgoing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Actor>,
    /// The actor who moved the contract into Outgoing. Holds
    /// responsibility there until it is returned to work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatched_by: Option<Actor>,
    /// Persisted location tag.
    pub pool_state: PoolState,
    /// Set when the contract was refused; cleared when it re-enters work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
}

impl Contract {
    /// Check every data-model invariant that can be judged from the record
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidRecord`] naming the first violation.
    pub fn validate(&self) -> Result<(), RoutingError> {
        let invalid = |reason: &str| Err(RoutingError::invalid_record(&self.id, reason));

        if self.title.trim().is_empty() {
            return invalid("title must not be empty");
        }
        if self.customer.is_new && self.customer.completed_contracts.unwrap_or(0) > 0 {
            return invalid("a new customer cannot have completed contracts");
        }
        if self.work_status.is_some() && self.pool_state != PoolState::Work {
            return invalid("work status is only allowed in the work pool");
        }
        match self.pool_state {
            PoolState::Incoming => {
                if self.dispatched_by.is_some() {
                    return invalid("an incoming contract cannot have a dispatcher");
                }
                if self.rejection.is_some() {
                    return invalid("an incoming contract cannot carry a rejection");
                }
            }
            PoolState::Work => {
                if self.assigned_to.is_none() {
                    return invalid("a contract in work must have a responsible actor");
                }
                if self.dispatched_by.is_some() {
                    return invalid("a contract in work cannot have a dispatcher");
                }
                if self.rejection.is_some() {
                    return invalid("a contract in work cannot carry a rejection");
                }
            }
            PoolState::Outgoing => {
                if self.dispatched_by.is_none() {
                    return invalid("an outgoing contract must record who dispatched it");
                }
            }
        }
        Ok(())
    }
}

// ─── Intake ──────────────────────────────────────────────────────────

/// A contract as delivered by the external intake process.
///
/// Always lands in Incoming: Addressed when `assigned_to` is set,
/// Free otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContract {
    pub id: ContractId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub stage: Stage,
    pub time_remaining: TimeRemaining,
    pub customer: Customer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_from: Option<Actor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Actor>,
}

impl NewContract {
    /// Build the incoming contract record.
    pub fn into_contract(self) -> Contract {
        Contract {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            stage: self.stage,
            work_status: None,
            time_remaining: self.time_remaining,
            customer: self.customer,
            assigned_from: self.assigned_from,
            assigned_to: self.assigned_to,
            dispatched_by: None,
            pool_state: PoolState::Incoming,
            rejection: None,
        }
    }
}

// ─── Collaborator updates ────────────────────────────────────────────

/// Non-routing attribute changes pushed by external collaborators: the
/// SLA clock (`time_remaining`), the stage-advancement process (`stage`),
/// and work prioritisation (`work_status`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeUpdate {
    #[serde(default)]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub time_remaining: Option<TimeRemaining>,
    #[serde(default)]
    pub work_status: Option<WorkStatus>,
}

impl AttributeUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.stage.is_none() && self.time_remaining.is_none() && self.work_status.is_none()
    }

    /// Apply the update to a copy of `contract`.
    pub(crate) fn applied_to(&self, contract: &Contract) -> Contract {
        let mut next = contract.clone();
        if let Some(stage) = self.stage {
            next.stage = stage;
        }
        if let Some(remaining) = &self.time_remaining {
            next.time_remaining = remaining.clone();
        }
        if let Some(status) = self.work_status {
            next.work_status = Some(status);
        }
        next
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lway_core::ActorName;

    pub(crate) fn actor(name: &str, department: &str) -> Actor {
        Actor::new(ActorName::new(name).unwrap(), department)
    }

    pub(crate) fn incoming(id: &str, assigned_to: Option<Actor>) -> Contract {
        NewContract {
            id: ContractId::new(id).unwrap(),
            title: format!("Contract No.{id}"),
            description: "Smartphones and tablets from Shenzhen".to_string(),
            category: "Electronics".to_string(),
            stage: Stage::SupplierSearch,
            time_remaining: TimeRemaining::new("15 days"),
            customer: Customer::new_customer("TechnoSphere LLC"),
            assigned_from: Some(actor("Alexey", "Sales")),
            assigned_to,
        }
        .into_contract()
    }

    // ── Stage ────────────────────────────────────────────────────────

    #[test]
    fn test_stage_ordinals_follow_pipeline() {
        let ordinals: Vec<u8> = Stage::ALL.iter().map(Stage::ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5, 6]);
        assert!(Stage::SupplierSearch < Stage::Delivery);
    }

    #[test]
    fn test_stage_wire_names() {
        let json = serde_json::to_string(&Stage::SampleApproval).unwrap();
        assert_eq!(json, "\"sample_approval\"");
        assert_eq!(Stage::Customs.to_string(), "customs");
        assert_eq!(Stage::Customs.label(), "Customs clearance");
    }

    // ── Intake ───────────────────────────────────────────────────────

    #[test]
    fn test_new_contract_lands_in_incoming() {
        let c = incoming("C-001", None);
        assert_eq!(c.pool_state, PoolState::Incoming);
        assert!(c.assigned_to.is_none());
        assert!(c.dispatched_by.is_none());
        assert!(c.validate().is_ok());
    }

    // ── Invariants ───────────────────────────────────────────────────

    #[test]
    fn test_new_customer_with_history_is_invalid() {
        let mut c = incoming("C-001", None);
        c.customer.completed_contracts = Some(3);
        let err = c.validate().unwrap_err();
        assert!(matches!(err, RoutingError::InvalidRecord { .. }));
    }

    #[test]
    fn test_new_customer_with_zero_history_is_valid() {
        let mut c = incoming("C-001", None);
        c.customer.completed_contracts = Some(0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_work_requires_assignee() {
        let mut c = incoming("C-005", None);
        c.pool_state = PoolState::Work;
        assert!(c.validate().is_err());
        c.assigned_to = Some(actor("Olga", "Customs"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_work_cannot_carry_rejection() {
        let mut c = incoming("C-005", Some(actor("Olga", "Customs")));
        c.pool_state = PoolState::Work;
        c.rejection = Some(Rejection {
            by: actor("Olga", "Customs"),
            reason: "incomplete documents".to_string(),
            at: Timestamp::now(),
        });
        assert!(matches!(c.validate(), Err(RoutingError::InvalidRecord { .. })));
        c.rejection = None;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_work_status_outside_work_is_invalid() {
        let mut c = incoming("C-001", None);
        c.work_status = Some(WorkStatus::Active);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_outgoing_requires_dispatcher() {
        let mut c = incoming("C-007", None);
        c.pool_state = PoolState::Outgoing;
        assert!(c.validate().is_err());
        c.dispatched_by = Some(actor("Maxim", "Warehouse"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_blank_title_is_invalid() {
        let mut c = incoming("C-001", None);
        c.title = "  ".to_string();
        assert!(c.validate().is_err());
    }

    // ── Attribute updates ────────────────────────────────────────────

    #[test]
    fn test_attribute_update_leaves_routing_fields() {
        let c = incoming("C-003", Some(actor("Ivan", "Manager")));
        let update = AttributeUpdate {
            stage: Some(Stage::Logistics),
            time_remaining: Some(TimeRemaining::new("6 days")),
            work_status: None,
        };
        let next = update.applied_to(&c);
        assert_eq!(next.stage, Stage::Logistics);
        assert_eq!(next.time_remaining.as_str(), "6 days");
        assert_eq!(next.assigned_to, c.assigned_to);
        assert_eq!(next.pool_state, c.pool_state);
        assert!(!update.is_empty());
        assert!(AttributeUpdate::default().is_empty());
    }

    #[test]
    fn test_contract_serialization_omits_empty_options() {
        let c = incoming("C-001", None);
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("assigned_to").is_none());
        assert!(json.get("work_status").is_none());
        assert_eq!(json["pool_state"], "incoming");
        let parsed: Contract = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, c);
    }
}
