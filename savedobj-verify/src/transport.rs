//! HTTP transport backed by `reqwest`.

use async_trait::async_trait;
use reqwest::Url;
use savedobj_core::{Credentials, RawResponse, SavedObjectsTransport, TransportError};
use serde_json::Value;
use std::time::Duration;

/// Sends update requests to a running saved-object API.
#[derive(Clone)]
pub struct RestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl RestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| TransportError::InvalidRequest(format!("invalid base url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidRequest(format!(
                "base url '{}' cannot carry a path",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `path` to the base url, percent-encoding each segment.
    pub fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TransportError::InvalidRequest(format!("base url '{}' cannot carry a path", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        Ok(url)
    }
}

#[async_trait]
impl SavedObjectsTransport for RestTransport {
    async fn put_json(
        &self,
        path: &str,
        credentials: Option<&Credentials>,
        body: &Value,
    ) -> Result<RawResponse, TransportError> {
        let url = self.url_for(path)?;
        let request_error = |e: reqwest::Error| TransportError::Request {
            path: path.to_string(),
            reason: e.to_string(),
        };

        let mut request = self.client.put(url).json(body);
        if let Some(credentials) = credentials {
            request = request.basic_auth(credentials.username(), Some(credentials.expose_password()));
        }

        let response = request.send().await.map_err(request_error)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(request_error)?;

        tracing::debug!(path, status, "update request completed");
        Ok(RawResponse::from_bytes(status, &bytes))
    }
}

impl std::fmt::Debug for RestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
