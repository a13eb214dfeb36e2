//! PDF renderer via an external HTML-to-PDF engine.
//!
//! Reuses the HTML pipeline with print-oriented CSS, writes the page to
//! a temp file, and invokes the configured engine as
//! `{engine} input.html output.pdf`.

use std::fs;
use std::process::Command;

use tracing::debug;

use crate::error::RenderError;
use crate::format::DocumentRenderer;
use crate::html::{HtmlRenderer, PRINT_CSS};
use crate::options::RenderOptions;

/// Renders markdown to PDF through an external engine subprocess.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfRenderer;

impl DocumentRenderer for PdfRenderer {
    fn render(&self, markdown: &str, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
        let html = HtmlRenderer.render_page(markdown, &print_options(options));

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("document.html");
        let output = dir.path().join("document.pdf");
        fs::write(&input, html)?;

        debug!(engine = %options.pdf_engine, "invoking PDF engine");
        let result = Command::new(&options.pdf_engine)
            .arg(&input)
            .arg(&output)
            .output()
            .map_err(|e| RenderError::PdfEngine {
                command: options.pdf_engine.clone(),
                message: e.to_string(),
            })?;

        if !result.status.success() {
            return Err(RenderError::PdfEngine {
                command: options.pdf_engine.clone(),
                message: String::from_utf8_lossy(&result.stderr).trim().to_owned(),
            });
        }

        Ok(fs::read(&output)?)
    }
}

/// Print variant of the request options.
///
/// The engine has no JavaScript runtime, so the browser-side mermaid
/// tier is disabled and the resolver falls through to the CLI or the
/// literal-source fallback. Fragment mode is meaningless for paged
/// output and is cleared.
fn print_options(options: &RenderOptions) -> RenderOptions {
    let mut print = options.clone();
    print.diagrams.mermaid_server = None;
    print.fragment = false;
    print.table_style = Some(match &options.table_style {
        Some(style) => format!("{style}\n{PRINT_CSS}"),
        None => PRINT_CSS.to_owned(),
    });
    print
}
