//! Axum REST API handlers.
//!
//! Each handler makes exactly one store call and translates the outcome;
//! grant lifecycle rules stay in [`crate::store`].

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::errors::GrantError;
use crate::model::{Grant, GrantStatus};
use crate::store::GrantStore;

pub struct ApiState {
    pub store: GrantStore,
}

/// Build the router over an explicitly constructed store.
pub fn build_router(store: GrantStore) -> Router {
    let state = Arc::new(ApiState { store });

    Router::new()
        .route("/health", get(health))
        .route("/grant/:id", get(get_grant).post(close_grant))
        .route("/grants", get(get_all_grants).post(create_grant))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn status_for(err: &GrantError) -> StatusCode {
    match err {
        GrantError::NotFound(_) => StatusCode::NOT_FOUND,
        GrantError::Conflict(_) => StatusCode::CONFLICT,
        GrantError::InvalidStatus(_) | GrantError::EmptyGrantId => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: GrantError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        warn!("Request failed: {err}");
    }
    error_body(status, err.to_string())
}

fn error_body(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /grant/:id`
pub async fn get_grant(
    State(state): State<Arc<ApiState>>,
    Path(grant_id): Path<String>,
) -> Response {
    match state.store.get_grant(&grant_id).await {
        Ok(grant) => (StatusCode::OK, Json(grant)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /grant/:id`
///
/// Closes the grant's funding window.
pub async fn close_grant(
    State(state): State<Arc<ApiState>>,
    Path(grant_id): Path<String>,
) -> Response {
    match state
        .store
        .update_grant_status(&grant_id, GrantStatus::Closed)
        .await
    {
        Ok(()) => (StatusCode::OK, "Grant status updated to closed").into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /grants`
pub async fn get_all_grants(State(state): State<Arc<ApiState>>) -> Response {
    match state.store.get_all_grants().await {
        Ok(grants) => (StatusCode::OK, Json(grants)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /grants`
///
/// Creates a grant from a full JSON body, ledger included. A body that does
/// not parse keeps the extractor's status code but uses the JSON error shape.
pub async fn create_grant(
    State(state): State<Arc<ApiState>>,
    payload: std::result::Result<Json<Grant>, JsonRejection>,
) -> Response {
    let grant = match payload {
        Ok(Json(grant)) => grant,
        Err(rejection) => return error_body(rejection.status(), rejection.body_text()),
    };

    match state.store.insert_grant(&grant).await {
        Ok(()) => (StatusCode::CREATED, Json(grant)).into_response(),
        Err(e) => error_response(e),
    }
}
