//! # Board Snapshot
//!
//! A YAML document listing contracts in any pool, used to seed a registry
//! (see `fixtures/board.yaml`). Loading goes through
//! [`crate::ContractRegistry::hydrate`], which validates every record.

use std::path::Path;

use serde::{Deserialize, Serialize};

use lway_core::LwayError;

use crate::contract::Contract;

/// Contracts to load into a fresh registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub contracts: Vec<Contract>,
}

impl BoardSnapshot {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LwayError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, LwayError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }
}
