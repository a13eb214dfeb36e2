//! `mdr serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdr_config::{CliSettings, Config};
use mdr_server::run_server;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover mdr.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// PlantUML server URL (overrides config).
    #[arg(long)]
    plantuml_server: Option<String>,

    /// Mermaid script server URL (overrides config).
    #[arg(long)]
    mermaid_server: Option<String>,

    /// HTML-to-PDF engine command (overrides config).
    #[arg(long)]
    pdf_engine: Option<String>,

    /// Enable verbose output (request and diagram logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            plantuml_server: self.plantuml_server,
            mermaid_server: self.mermaid_server,
            pdf_engine: self.pdf_engine,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        if let Some(path) = &config.config_path {
            output.info(&format!("Using config: {}", path.display()));
        }

        run_server(config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    }
}
