//! `mdr render` command implementation.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use mdr_config::{CliSettings, Config};
use mdr_render::{OutputFormat, RenderOptions, render_document};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Input markdown file.
    input: PathBuf,

    /// Output file (default: input path with the target extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: html, pdf, docx, or xlsx.
    #[arg(short, long, default_value = "html")]
    format: String,

    /// Document title (default: first H1 heading).
    #[arg(short, long)]
    title: Option<String>,

    /// Prepend a table of contents (HTML and PDF).
    #[arg(long)]
    toc: bool,

    /// Skip the default stylesheet (HTML and PDF).
    #[arg(long)]
    no_css: bool,

    /// Emit only the HTML fragment without the page wrapper.
    #[arg(long)]
    fragment: bool,

    /// Table style: CSS for HTML/PDF, a Word style name for DOCX.
    #[arg(long)]
    table_style: Option<String>,

    /// PlantUML server URL (overrides config).
    #[arg(long)]
    plantuml_server: Option<String>,

    /// Mermaid script server URL (overrides config).
    #[arg(long)]
    mermaid_server: Option<String>,

    /// Path to configuration file (default: auto-discover mdr.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (show diagram degradation warnings).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading, rendering, or
    /// writing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let format: OutputFormat = self.format.parse()?;

        let cli_settings = CliSettings {
            plantuml_server: self.plantuml_server,
            mermaid_server: self.mermaid_server,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let markdown = fs::read_to_string(&self.input)?;

        let options = RenderOptions {
            title: self.title,
            include_toc: self.toc,
            include_css: !self.no_css,
            fragment: self.fragment,
            table_style: self.table_style,
            diagrams: config.diagram_config(),
            pdf_engine: config.pdf.engine.clone(),
        };

        let bytes = render_document(format, &markdown, &options)?;

        let target = self
            .output
            .unwrap_or_else(|| self.input.with_extension(format.extension()));
        fs::write(&target, bytes)?;

        output.success(&format!("Wrote {}", target.display()));
        Ok(())
    }
}
