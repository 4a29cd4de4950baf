//! # Engine Loading
//!
//! Builds a [`RoutingEngine`] from the global `--config` and `--board`
//! flags.

use std::path::Path;

use anyhow::{Context, Result};

use lway_routing::{BoardSnapshot, EngineConfig, RoutingEngine};

/// Resolve the engine configuration: YAML file if given, defaults
/// otherwise, then environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let config = config
        .apply_env()
        .context("invalid engine configuration override")?;
    tracing::debug!(claim_confirmation_ms = config.claim_confirmation_ms, "engine configuration");
    Ok(config)
}

/// Build an engine, hydrated from `board` when given.
pub fn load_engine(config: Option<&Path>, board: Option<&Path>) -> Result<RoutingEngine> {
    let config = load_config(config)?;
    let Some(board) = board else {
        tracing::info!("no board snapshot given; starting with an empty registry");
        return Ok(RoutingEngine::new(config));
    };
    let snapshot = BoardSnapshot::from_yaml_file(board)
        .with_context(|| format!("failed to read board {}", board.display()))?;
    RoutingEngine::from_snapshot(config, snapshot)
        .with_context(|| format!("failed to load board {}", board.display()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    pub(crate) fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../fixtures")
            .join(name)
    }

    #[test]
    fn test_load_reference_board() {
        let engine = load_engine(
            Some(&fixture("engine.yaml")),
            Some(&fixture("board.yaml")),
        )
        .unwrap();
        assert_eq!(engine.pool_summary().total(), 10);
    }

    #[test]
    fn test_config_file_reaches_engine() {
        let engine = load_engine(Some(&fixture("engine.yaml")), None).unwrap();
        if std::env::var(lway_routing::CLAIM_CONFIRMATION_ENV).is_err() {
            assert_eq!(engine.config().claim_confirmation_ms, 1500);
        }
    }

    #[test]
    fn test_no_board_is_empty() {
        let engine = load_engine(None, None).unwrap();
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn test_missing_board_names_the_path() {
        let err = load_engine(None, Some(Path::new("/nonexistent/board.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/board.yaml"));
    }
}
