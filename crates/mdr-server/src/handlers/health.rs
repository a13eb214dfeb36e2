//! Health endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Response for GET /health.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the service is reachable.
    pub status: &'static str,
    /// Application version.
    pub version: &'static str,
}

/// Handle GET /health.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: state.version,
    })
}
