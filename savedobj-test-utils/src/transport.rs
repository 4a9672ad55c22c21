//! In-process transport: requests go straight into an axum router.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use savedobj_core::{Credentials, RawResponse, SavedObjectsTransport, TransportError};
use serde_json::Value;
use tower::ServiceExt;

use crate::security::basic_auth_header;

#[derive(Debug, Clone)]
pub struct RouterTransport {
    router: Router,
}

impl RouterTransport {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

/// Percent-encode every segment of `path`, keeping the separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl SavedObjectsTransport for RouterTransport {
    async fn put_json(
        &self,
        path: &str,
        credentials: Option<&Credentials>,
        body: &Value,
    ) -> Result<RawResponse, TransportError> {
        let request_error = |reason: String| TransportError::Request {
            path: path.to_string(),
            reason,
        };

        let mut builder = Request::builder()
            .method(Method::PUT)
            .uri(encode_path(path))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(credentials) = credentials {
            builder = builder.header(header::AUTHORIZATION, basic_auth_header(credentials));
        }
        let request = builder
            .body(Body::from(body.to_string()))
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| request_error(format!("{:?}", e)))?;

        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| request_error(format!("Failed to read body: {:?}", e)))?;

        Ok(RawResponse::from_bytes(status, &bytes))
    }
}
