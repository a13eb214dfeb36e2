//! Fence scanning and the tiered resolution chain.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use ureq::Agent;

use crate::consts::{DEFAULT_MERMAID_CLI, DEFAULT_PLANTUML_SERVER, SERVER_TIMEOUT};
use crate::mermaid;
use crate::plantuml;

/// Matches fenced `mermaid`/`plantuml` blocks at line start.
///
/// Resolved output contains HTML markup instead of fences, so running
/// the resolver over its own output is a no-op.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^```[ \t]*(mermaid|plantuml)[ \t]*\r?\n(.*?)^```[ \t]*$").unwrap()
});

/// Diagram resolution configuration, threaded down per request.
#[derive(Clone, Debug)]
pub struct DiagramConfig {
    /// `PlantUML` server base URL.
    pub plantuml_server: String,
    /// Mermaid browser-side script URL; enables client-side rendering.
    pub mermaid_server: Option<String>,
    /// Mermaid CLI command (`None` disables the local renderer tier).
    pub mermaid_cli: Option<String>,
    /// Verify the `PlantUML` server URL before emitting an image reference.
    pub verify_servers: bool,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            plantuml_server: DEFAULT_PLANTUML_SERVER.to_owned(),
            mermaid_server: None,
            mermaid_cli: Some(DEFAULT_MERMAID_CLI.to_owned()),
            verify_servers: true,
        }
    }
}

/// Error from a single resolution attempt.
///
/// These never propagate out of [`DiagramResolver::resolve`]; they select
/// the next fallback tier and surface as warnings.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("'{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("diagram server returned HTTP {0}")]
    Http(u16),

    #[error("failed to reach diagram server: {0}")]
    Transport(String),
}

/// Result of resolving diagram fences in a document.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// Text with every diagram fence replaced by markup or a fallback.
    pub text: String,
    /// Degradation warnings (lower tier taken). Never fails the render.
    pub warnings: Vec<String>,
}

/// Replaces fenced diagram blocks with rendered-image markup.
///
/// Every block appears in the output, in original order, as an image
/// reference or an explicit fallback; no block is dropped. Each tier is
/// tried once with no retries.
pub struct DiagramResolver {
    config: DiagramConfig,
    agent: Agent,
}

impl DiagramResolver {
    /// Create a resolver for the given configuration.
    #[must_use]
    pub fn new(config: DiagramConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(SERVER_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        Self { config, agent }
    }

    /// Resolve all diagram fences in `text`.
    ///
    /// Text without diagram fences is returned unchanged.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Resolution {
        let mut warnings = Vec::new();

        let resolved = FENCE_RE.replace_all(text, |caps: &Captures<'_>| {
            let language = &caps[1];
            let source = caps[2].trim();
            match language {
                "plantuml" => self.resolve_plantuml(source, &caps[0], &mut warnings),
                "mermaid" => self.resolve_mermaid(source, &mut warnings),
                _ => caps[0].to_owned(),
            }
        });

        for warning in &warnings {
            tracing::warn!(warning = %warning, "diagram resolution degraded");
        }

        Resolution {
            text: resolved.into_owned(),
            warnings,
        }
    }

    /// Resolve a `PlantUML` block to a server image reference.
    ///
    /// On encoding failure or unreachable server, the original fenced
    /// block is kept as literal text so the document still renders.
    fn resolve_plantuml(&self, source: &str, original: &str, warnings: &mut Vec<String>) -> String {
        let url = match plantuml::plantuml_url(&self.config.plantuml_server, source) {
            Ok(url) => url,
            Err(e) => {
                warnings.push(format!("plantuml: encoding failed ({e}), keeping source"));
                return original.to_owned();
            }
        };

        if self.config.verify_servers
            && let Err(e) = self.probe(&url)
        {
            warnings.push(format!("plantuml: {e}, keeping source"));
            return original.to_owned();
        }

        format!(r#"<div class="plantuml-diagram"><img src="{url}" alt="PlantUML diagram"></div>"#)
    }

    /// Resolve a Mermaid block through the three-tier chain.
    ///
    /// Local CLI first, then client-side markup when a Mermaid script URL
    /// is configured, then the raw source as a labeled code block. The
    /// final tier always succeeds.
    fn resolve_mermaid(&self, source: &str, warnings: &mut Vec<String>) -> String {
        if let Some(cli) = &self.config.mermaid_cli {
            match mermaid::render_with_cli(cli, source) {
                Ok(png) => return mermaid::inline_png_markup(&png),
                Err(e) => {
                    warnings.push(format!("mermaid: local renderer unavailable ({e})"));
                }
            }
        }

        if self.config.mermaid_server.is_some() {
            return mermaid::client_side_markup(source);
        }

        warnings.push("mermaid: no renderer available, emitting source".to_owned());
        mermaid::source_fallback_markup(source)
    }

    /// Fetch a diagram URL once to check the server is reachable.
    fn probe(&self, url: &str) -> Result<(), DiagramError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| DiagramError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(DiagramError::Http(status));
        }
        Ok(())
    }
}
