//! # Identity Newtypes
//!
//! Identifiers for contracts, actors, and audit events.
//!
//! Contract ids come from the external intake process (e.g. `C-001`) and
//! are opaque to the engine: nothing is ever derived from their shape.
//! Actor names are compared verbatim for permission checks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LwayError;

/// Maximum length accepted for contract ids and actor names.
const MAX_IDENT_LEN: usize = 128;

fn validate_ident(kind: &str, raw: String) -> Result<String, LwayError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LwayError::Validation(format!("{kind} must not be empty")));
    }
    if trimmed.len() > MAX_IDENT_LEN {
        return Err(LwayError::Validation(format!(
            "{kind} must not exceed {MAX_IDENT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Unique, immutable identifier of a trade contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractId(String);

impl ContractId {
    /// Create a validated contract id. Surrounding whitespace is trimmed.
    pub fn new(raw: impl Into<String>) -> Result<Self, LwayError> {
        validate_ident("contract id", raw.into()).map(Self)
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContractId {
    type Error = LwayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContractId> for String {
    fn from(id: ContractId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a person or role issuing commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActorName(String);

impl ActorName {
    /// Create a validated actor name.
    pub fn new(raw: impl Into<String>) -> Result<Self, LwayError> {
        validate_ident("actor name", raw.into()).map(Self)
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActorName {
    type Error = LwayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActorName> for String {
    fn from(name: ActorName) -> Self {
        name.0
    }
}

impl std::fmt::Display for ActorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A party in the routing pipeline: who they are and which department
/// they act for (sales, procurement, logistics, customs, manager, ...).
///
/// Equality of responsibility is decided on `name` alone; see
/// [`Actor::is`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// The actor's identity.
    pub name: ActorName,
    /// Department the actor acts for.
    pub department: String,
}

impl Actor {
    /// Create an actor record.
    pub fn new(name: ActorName, department: impl Into<String>) -> Self {
        Self {
            name,
            department: department.into(),
        }
    }

    /// Whether this record names the same actor as `other`.
    pub fn is(&self, other: &ActorName) -> bool {
        &self.name == other
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.department)
    }
}

/// Unique identifier of a committed audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditEventId(pub Uuid);

impl AuditEventId {
    /// Generate a new random audit event identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AuditEventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AuditEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "audit:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_contract_id_trims_whitespace() {
        let id = ContractId::new("  C-001 ").unwrap();
        assert_eq!(id.as_str(), "C-001");
        assert_eq!(id.to_string(), "C-001");
    }

    #[test]
    fn test_contract_id_rejects_blank() {
        assert!(ContractId::new("").is_err());
        assert!(ContractId::new("   ").is_err());
    }

    #[test]
    fn test_contract_id_rejects_overlong() {
        let long = "x".repeat(MAX_IDENT_LEN + 1);
        assert!(ContractId::new(long).is_err());
    }

    #[test]
    fn test_contract_id_ordering_is_lexical() {
        let a = ContractId::new("C-001").unwrap();
        let b = ContractId::new("C-010").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_contract_id_serde_rejects_blank() {
        let result: Result<ContractId, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
        let parsed: ContractId = serde_json::from_str("\"C-003\"").unwrap();
        assert_eq!(parsed.as_str(), "C-003");
    }

    #[test]
    fn test_actor_identity_ignores_department() {
        let ivan = Actor::new(ActorName::new("Ivan").unwrap(), "Manager");
        assert!(ivan.is(&ActorName::new("Ivan").unwrap()));
        assert!(!ivan.is(&ActorName::new("Petr").unwrap()));
        assert_eq!(ivan.to_string(), "Ivan (Manager)");
    }

    #[test]
    fn test_audit_event_ids_are_unique() {
        assert_ne!(AuditEventId::new(), AuditEventId::new());
    }

    proptest! {
        #[test]
        fn actor_name_accepts_any_non_blank(name in "[A-Za-z][A-Za-z0-9 _-]{0,40}") {
            let parsed = ActorName::new(name.clone());
            prop_assert!(parsed.is_ok());
            let parsed = parsed.unwrap();
            prop_assert_eq!(parsed.as_str(), name.trim());
        }
    }
}
