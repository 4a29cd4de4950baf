//! # Error Types
//!
//! Shared error type for identifier validation, timestamp parsing, and
//! loading of YAML documents (board snapshots, engine configuration).
//! Routing-specific failures live in `lway-routing::RoutingError`.

use thiserror::Error;

/// Top-level error type for LibriumWay foundational operations.
#[derive(Error, Debug)]
pub enum LwayError {
    /// An identifier or field value failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp: {0}")]
    Timestamp(String),

    /// YAML document could not be parsed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
