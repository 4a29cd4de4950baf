//! # Engine Configuration
//!
//! Read from YAML, with an environment override for the claim
//! confirmation delay.
//!
//! ```yaml
//! claim_confirmation_ms: 1500
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lway_core::LwayError;

/// Environment variable overriding [`EngineConfig::claim_confirmation_ms`].
pub const CLAIM_CONFIRMATION_ENV: &str = "LWAY_CLAIM_CONFIRMATION_MS";

/// Default confirmation delay between beginning and committing a take.
pub const DEFAULT_CLAIM_CONFIRMATION_MS: u64 = 1500;

/// Tunables of the routing engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Delay, in milliseconds, between registering a claim and committing
    /// it in [`crate::RoutingEngine::take`].
    pub claim_confirmation_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            claim_confirmation_ms: DEFAULT_CLAIM_CONFIRMATION_MS,
        }
    }
}

impl EngineConfig {
    /// Config with the given confirmation delay.
    pub fn with_claim_confirmation(delay: Duration) -> Self {
        Self {
            claim_confirmation_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// The confirmation delay as a `Duration`.
    pub fn claim_confirmation(&self) -> Duration {
        Duration::from_millis(self.claim_confirmation_ms)
    }

    /// Parse a YAML document. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LwayError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, LwayError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, LwayError> {
        self.apply_override(std::env::var(CLAIM_CONFIRMATION_ENV).ok())
    }

    fn apply_override(mut self, raw: Option<String>) -> Result<Self, LwayError> {
        if let Some(raw) = raw {
            self.claim_confirmation_ms = raw.trim().parse().map_err(|e| {
                LwayError::Validation(format!("{CLAIM_CONFIRMATION_ENV}={raw:?}: {e}"))
            })?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_delay() {
        let config = EngineConfig::default();
        assert_eq!(config.claim_confirmation(), Duration::from_millis(1500));
    }

    #[test]
    fn test_yaml_overrides_default() {
        let config = EngineConfig::from_yaml_str("claim_confirmation_ms: 20\n").unwrap();
        assert_eq!(config.claim_confirmation_ms, 20);
    }

    #[test]
    fn test_empty_yaml_mapping_is_default() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(EngineConfig::from_yaml_str("claim_timeout_ms: 5\n").is_err());
    }

    #[test]
    fn test_env_override() {
        let config = EngineConfig::default()
            .apply_override(Some(" 250 ".to_string()))
            .unwrap();
        assert_eq!(config.claim_confirmation_ms, 250);
        let unchanged = EngineConfig::default().apply_override(None).unwrap();
        assert_eq!(unchanged, EngineConfig::default());
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let err = EngineConfig::default()
            .apply_override(Some("soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(CLAIM_CONFIRMATION_ENV));
    }

    #[test]
    fn test_with_claim_confirmation() {
        let config = EngineConfig::with_claim_confirmation(Duration::from_millis(5));
        assert_eq!(config.claim_confirmation_ms, 5);
    }
}
