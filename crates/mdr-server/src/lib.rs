//! HTTP rendering API for MDR.
//!
//! Serves the conversion pipeline over a small JSON API:
//!
//! - `GET /health` — service liveness and version
//! - `POST /render/{html,pdf,docx,xlsx}` — render to a fixed format
//! - `POST /render` — render with the format in the request body
//!
//! HTML responses are returned inline; PDF, DOCX, and XLSX payloads are
//! returned as file attachments with the matching content type.

mod app;
mod error;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use mdr_config::Config;

use crate::state::AppState;

/// Run the server until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the listen address is invalid or binding fails.
pub async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from_str(&format!("{}:{}", config.server.host, config.server.port))?;

    let state = Arc::new(AppState::new(config));
    let app = app::create_router(state);

    tracing::info!("Starting server at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
