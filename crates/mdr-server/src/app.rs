//! Router assembly.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::get_health))
        .route("/render", post(handlers::render::render_any))
        .route("/render/{format}", post(handlers::render::render_fixed))
        .with_state(state)
}
