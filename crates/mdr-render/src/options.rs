//! Per-request render options.

use mdr_diagrams::DiagramConfig;

/// Default external HTML-to-PDF engine command.
pub(crate) const DEFAULT_PDF_ENGINE: &str = "weasyprint";

/// Options for a single render operation.
///
/// Process-wide defaults (server URLs, engine commands) are resolved
/// once at startup and threaded down explicitly through this struct;
/// renderers never consult globals.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Document title. Falls back to the first H1, then "Document".
    pub title: Option<String>,
    /// Prepend a table-of-contents navigation block (HTML/PDF).
    pub include_toc: bool,
    /// Include the default stylesheet (HTML/PDF).
    pub include_css: bool,
    /// Return only the HTML fragment without the page wrapper (HTML).
    pub fragment: bool,
    /// Table styling: CSS text for HTML/PDF, a named built-in table
    /// style for Word (default "Table Grid").
    pub table_style: Option<String>,
    /// Diagram resolution configuration.
    pub diagrams: DiagramConfig,
    /// External HTML-to-PDF engine command.
    pub pdf_engine: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: None,
            include_toc: false,
            include_css: true,
            fragment: false,
            table_style: None,
            diagrams: DiagramConfig::default(),
            pdf_engine: DEFAULT_PDF_ENGINE.to_owned(),
        }
    }
}

impl RenderOptions {
    /// Effective document title given an extracted fallback.
    pub(crate) fn effective_title(&self, extracted: Option<&str>) -> String {
        self.title
            .clone()
            .or_else(|| extracted.map(str::to_owned))
            .unwrap_or_else(|| "Document".to_owned())
    }
}
