//! # Replication Graph Error Types
//!
//! The routing engine surfaces errors only at startup, for configuration
//! problems. Runtime lookups default on miss instead of failing: an
//! unmapped type routes nowhere, and that is by contract not an error.

use thiserror::Error;

/// Errors that can occur while configuring the replication graph.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Configuration value out of range.
    #[error("invalid graph configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file did not parse.
    #[error("failed to parse graph configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for graph configuration operations.
pub type GraphResult<T> = Result<T, GraphError>;
