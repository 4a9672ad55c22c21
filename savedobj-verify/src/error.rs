//! Error types for the verifier binary and its setup paths.
//!
//! Contract mismatches are not errors here; they are reported as data in
//! [`ScenarioReport`](crate::ScenarioReport). These variants cover failures
//! to get a run going at all.

use savedobj_core::{CoreError, FixtureError, TransportError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),

    #[error("Invalid value: {0}")]
    Core(#[from] CoreError),

    #[error("Scenario '{scenario}' is invalid: {reason}")]
    Scenario { scenario: String, reason: String },

    #[error("Failed to init telemetry: {0}")]
    Telemetry(String),
}

/// Result type alias for verifier setup.
pub type VerifyResult<T> = Result<T, VerifyError>;
