//! Error types for savedobj core operations

use thiserror::Error;

/// Errors raised while building core values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid space id '{value}': {reason}")]
    InvalidSpaceId { value: String, reason: String },

    #[error("Invalid object type '{value}': {reason}")]
    InvalidObjectType { value: String, reason: String },

    #[error("Unknown action '{0}'")]
    UnknownAction(String),
}

/// Failure to exchange a request with the saved-object API.
///
/// Only transport-level problems end up here; any HTTP status, including
/// 4xx and 5xx, is a response and is returned to the caller as data.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to {path} failed: {reason}")]
    Request { path: String, reason: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Failure to load or unload a named fixture dataset.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FixtureError {
    #[error("Unknown fixture dataset '{0}'")]
    UnknownDataset(String),

    #[error("Failed to load fixture '{name}': {reason}")]
    Load { name: String, reason: String },

    #[error("Failed to unload fixture '{name}': {reason}")]
    Unload { name: String, reason: String },
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
