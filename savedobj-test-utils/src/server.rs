//! Reference implementation of the saved-object update endpoint.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::put,
    Json, Router,
};
use chrono::Utc;
use savedobj_core::{Action, ErrorBody, ObjectType, SpaceId, UpdateRequest};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::security::Security;
use crate::store::ReferenceStore;

#[derive(Debug, Clone)]
struct ServerState {
    store: ReferenceStore,
    security: Arc<Security>,
}

/// Router serving `PUT /api/saved_objects/:type/:id` and its space-prefixed
/// form `PUT /s/:space/api/saved_objects/:type/:id`.
pub fn reference_router(store: ReferenceStore, security: Security) -> Router {
    let state = ServerState {
        store,
        security: Arc::new(security),
    };

    Router::new()
        .route("/api/saved_objects/:type/:id", put(update_in_default_space))
        .route("/s/:space/api/saved_objects/:type/:id", put(update_in_space))
        .with_state(state)
}

async fn update_in_default_space(
    State(state): State<ServerState>,
    Path((object_type, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let space = state.store.layout().default_space().clone();
    handle_update(&state, space, &object_type, &id, &headers, &body)
}

async fn update_in_space(
    State(state): State<ServerState>,
    Path((space, object_type, id)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let space = match SpaceId::new(space) {
        Ok(space) => space,
        Err(err) => return error_response(ErrorBody::bad_request(err.to_string())),
    };
    handle_update(&state, space, &object_type, &id, &headers, &body)
}

fn handle_update(
    state: &ServerState,
    space: SpaceId,
    object_type: &str,
    id: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    let object_type = match ObjectType::new(object_type) {
        Ok(object_type) => object_type,
        Err(err) => return error_response(ErrorBody::bad_request(err.to_string())),
    };

    let authorization = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    if let Err(rejection) = state
        .security
        .check(authorization, &space, &object_type, Action::Update)
    {
        tracing::debug!(space = %space, object_type = %object_type, id, status = rejection.status_code, "update rejected");
        return error_response(rejection);
    }

    let request: UpdateRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => {
            return error_response(ErrorBody::bad_request(format!("Invalid request payload JSON: {}", err)))
        }
    };

    match state
        .store
        .update(&space, &object_type, id, request.attributes, Utc::now())
    {
        Ok(object) => (StatusCode::OK, Json(object.to_updated_body())).into_response(),
        Err(rejection) => error_response(rejection),
    }
}

fn error_response(body: ErrorBody) -> Response {
    let status = StatusCode::from_u16(body.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

/// A reference server listening on a local port. Stops when dropped.
#[derive(Debug)]
pub struct ReferenceServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ReferenceServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for ReferenceServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve the reference router on `127.0.0.1` with an ephemeral port.
pub async fn spawn_reference_server(
    store: ReferenceStore,
    security: Security,
) -> std::io::Result<ReferenceServer> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = listener.local_addr()?;
    let app = reference_router(store, security);

    let handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!(error = %err, "reference server stopped");
        }
    });

    tracing::debug!(%addr, "reference server listening");
    Ok(ReferenceServer { addr, handle })
}
