//! Application state.
//!
//! Shared state for all request handlers.

use mdr_config::Config;
use mdr_render::RenderOptions;

/// Application state shared across all handlers.
pub struct AppState {
    /// Loaded service configuration.
    pub config: Config,
    /// Application version reported by the health endpoint.
    pub version: &'static str,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Render options seeded from the service configuration.
    ///
    /// Per-request fields are overlaid by the handlers.
    #[must_use]
    pub fn base_options(&self) -> RenderOptions {
        RenderOptions {
            diagrams: self.config.diagram_config(),
            pdf_engine: self.config.pdf.engine.clone(),
            ..RenderOptions::default()
        }
    }
}
