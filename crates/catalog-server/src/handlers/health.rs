//! Health handler

use crate::AppState;
use axum::{extract::State, Json};
use catalog_core::ConnectionState;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    cache: ConnectionState,
}

/// Liveness plus the cache connection state. The cache being down is not
/// unhealthy: the API keeps serving from the database.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cache: state.cache.state().await,
    })
}
