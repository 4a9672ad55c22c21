//! Collaborators injected into the contract verifier.
//!
//! The verifier never talks to a concrete HTTP stack or fixture tool; it is
//! handed implementations of these traits at construction.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{FixtureError, TransportError};
use crate::principal::Credentials;

/// Status and decoded body of an HTTP response.
///
/// Bodies that are not JSON are carried as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

impl RawResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Decode a response body, falling back to a string for non-JSON text.
    pub fn from_bytes(status: u16, bytes: &[u8]) -> Self {
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
        };
        Self { status, body }
    }
}

/// Issues requests against a saved-object API.
#[async_trait]
pub trait SavedObjectsTransport: Send + Sync {
    /// `PUT` a JSON body to `path` (including any space prefix), with basic
    /// auth when credentials are given.
    ///
    /// Path segments are passed unencoded; implementations encode them.
    async fn put_json(
        &self,
        path: &str,
        credentials: Option<&Credentials>,
        body: &Value,
    ) -> Result<RawResponse, TransportError>;
}

/// Loads and unloads named fixture datasets in the store under test.
#[async_trait]
pub trait FixtureLoader: Send + Sync {
    async fn load(&self, name: &str) -> Result<(), FixtureError>;

    async fn unload(&self, name: &str) -> Result<(), FixtureError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_response_from_json_bytes() {
        let response = RawResponse::from_bytes(200, br#"{"id":"x"}"#);
        assert_eq!(response.body, json!({"id": "x"}));
    }

    #[test]
    fn test_raw_response_from_text_bytes() {
        let response = RawResponse::from_bytes(502, b"Bad Gateway");
        assert_eq!(response.status, 502);
        assert_eq!(response.body, json!("Bad Gateway"));
    }

    #[test]
    fn test_raw_response_empty_body() {
        assert_eq!(RawResponse::from_bytes(204, b"").body, Value::Null);
    }
}
