//! Styled HTML page renderer.
//!
//! Resolves diagrams, parses the markdown, and wraps the resulting
//! fragment in a self-contained page template with an embedded
//! stylesheet and optional table-of-contents navigation.

use std::fmt::Write;

use mdr_diagrams::{DiagramResolver, MERMAID_CLIENT_CLASS};
use mdr_parser::{MarkdownParser, ParsedDocument, TocEntry, escape_html};

use crate::error::RenderError;
use crate::format::DocumentRenderer;
use crate::options::RenderOptions;

/// Default embedded stylesheet for standalone pages.
pub(crate) const DEFAULT_CSS: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, \
'Helvetica Neue', Arial, sans-serif; line-height: 1.6; color: #24292f; \
max-width: 860px; margin: 0 auto; padding: 2rem 1.5rem; }
h1, h2, h3, h4, h5, h6 { margin-top: 1.5em; margin-bottom: 0.5em; \
line-height: 1.25; }
h1 { font-size: 2em; border-bottom: 1px solid #d0d7de; padding-bottom: 0.3em; }
h2 { font-size: 1.5em; border-bottom: 1px solid #d0d7de; padding-bottom: 0.3em; }
pre { background: #f6f8fa; border-radius: 6px; padding: 1em; overflow-x: auto; }
code { font-family: 'SFMono-Regular', Consolas, 'Liberation Mono', Menlo, \
monospace; font-size: 0.9em; background: #f6f8fa; padding: 0.15em 0.3em; \
border-radius: 4px; }
pre code { background: none; padding: 0; }
table { border-collapse: collapse; margin: 1em 0; width: 100%; }
th, td { border: 1px solid #d0d7de; padding: 0.4em 0.8em; text-align: left; }
th { background: #f6f8fa; }
blockquote { border-left: 4px solid #d0d7de; margin-left: 0; \
padding-left: 1em; color: #57606a; }
img { max-width: 100%; }
nav.toc { background: #f6f8fa; border: 1px solid #d0d7de; border-radius: 6px; \
padding: 1em 1.5em; margin-bottom: 2em; }
nav.toc ul { list-style: none; padding-left: 0; margin: 0; }
nav.toc li { margin: 0.25em 0; }
nav.toc li.toc-level-2 { padding-left: 1em; }
nav.toc li.toc-level-3 { padding-left: 2em; }
nav.toc li.toc-level-4 { padding-left: 3em; }
nav.toc li.toc-level-5 { padding-left: 4em; }
nav.toc li.toc-level-6 { padding-left: 5em; }
.mermaid-diagram img, .mermaid-diagram { text-align: center; }
";

/// Print-oriented rules appended for the PDF pipeline.
pub(crate) const PRINT_CSS: &str = "\
@page { size: A4; margin: 2cm; }
body { max-width: none; padding: 0; }
pre, table, blockquote { page-break-inside: avoid; }
h1, h2, h3 { page-break-after: avoid; }
";

/// Renders markdown into a standalone HTML page (or a bare fragment).
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlRenderer;

impl DocumentRenderer for HtmlRenderer {
    fn render(&self, markdown: &str, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
        Ok(self.render_page(markdown, options).into_bytes())
    }
}

impl HtmlRenderer {
    /// Render to an HTML string.
    ///
    /// Infallible by construction: diagram degradation is absorbed by
    /// the resolver and malformed markdown still parses.
    #[must_use]
    pub fn render_page(&self, markdown: &str, options: &RenderOptions) -> String {
        let resolver = DiagramResolver::new(options.diagrams.clone());
        let resolution = resolver.resolve(markdown);
        let document = MarkdownParser::default().parse(&resolution.text);

        if options.fragment {
            return document.html;
        }
        build_page(&document, options)
    }
}

/// Assemble the full page around the parsed fragment.
fn build_page(document: &ParsedDocument, options: &RenderOptions) -> String {
    let title = options.effective_title(document.title.as_deref());
    let mut html = String::with_capacity(document.html.len() + 4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&title));

    if options.include_css {
        html.push_str("<style>\n");
        html.push_str(DEFAULT_CSS);
        if let Some(style) = &options.table_style {
            html.push_str(style);
            if !style.ends_with('\n') {
                html.push('\n');
            }
        }
        html.push_str("</style>\n");
    }
    html.push_str("</head>\n<body>\n");

    if options.include_toc && !document.toc.is_empty() {
        render_toc(&mut html, &document.toc);
    }

    html.push_str(&document.html);

    // Client-side mermaid only when the resolver actually emitted
    // placeholder blocks for it.
    if let Some(server) = &options.diagrams.mermaid_server
        && document
            .html
            .contains(&format!("class=\"{MERMAID_CLIENT_CLASS}\""))
    {
        render_mermaid_script(&mut html, server);
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Render the `<nav class="toc">` block.
fn render_toc(html: &mut String, toc: &[TocEntry]) {
    html.push_str("<nav class=\"toc\">\n<ul>\n");
    for entry in toc {
        let _ = writeln!(
            html,
            "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>",
            entry.level,
            entry.id,
            escape_html(&entry.title)
        );
    }
    html.push_str("</ul>\n</nav>\n");
}

/// Emit the browser-side mermaid module loader.
fn render_mermaid_script(html: &mut String, server: &str) {
    let src = format!("{}/mermaid.esm.min.mjs", server.trim_end_matches('/'));
    html.push_str("<script type=\"module\">\n");
    let _ = writeln!(html, "import mermaid from '{}';", escape_html(&src));
    html.push_str("mermaid.initialize({ startOnLoad: true });\n");
    html.push_str("</script>\n");
}

#[cfg(test)]
mod tests {
    use mdr_diagrams::DiagramConfig;

    use super::*;

    fn offline_options() -> RenderOptions {
        let mut options = RenderOptions::default();
        options.diagrams = DiagramConfig {
            verify_servers: false,
            mermaid_cli: None,
            ..DiagramConfig::default()
        };
        options
    }

    #[test]
    fn test_full_page_structure() {
        let page = HtmlRenderer.render_page("# Title\n\nBody text.", &offline_options());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Title</title>"));
        assert!(page.contains("<h1 id=\"title\">Title</h1>"));
        assert!(page.contains("<p>Body text.</p>"));
        assert!(page.ends_with("</html>\n"));
    }

    #[test]
    fn test_explicit_title_wins_over_heading() {
        let mut options = offline_options();
        options.title = Some("Manual".to_owned());
        let page = HtmlRenderer.render_page("# Extracted", &options);
        assert!(page.contains("<title>Manual</title>"));
    }

    #[test]
    fn test_title_falls_back_to_document() {
        let page = HtmlRenderer.render_page("plain paragraph", &offline_options());
        assert!(page.contains("<title>Document</title>"));
    }

    #[test]
    fn test_fragment_mode_skips_wrapper() {
        let mut options = offline_options();
        options.fragment = true;
        let fragment = HtmlRenderer.render_page("# Hi\n\ntext", &options);
        assert!(!fragment.contains("<!DOCTYPE html>"));
        assert!(fragment.contains("<h1 id=\"hi\">Hi</h1>"));
    }

    #[test]
    fn test_toc_rendered_when_requested() {
        let mut options = offline_options();
        options.include_toc = true;
        let page = HtmlRenderer.render_page("# One\n\n## Two\n\n### Three", &options);
        assert!(page.contains("<nav class=\"toc\">"));
        assert!(page.contains("<li class=\"toc-level-1\"><a href=\"#one\">One</a></li>"));
        assert!(page.contains("<li class=\"toc-level-2\"><a href=\"#two\">Two</a></li>"));
        assert!(page.contains("<li class=\"toc-level-3\"><a href=\"#three\">Three</a></li>"));
    }

    #[test]
    fn test_toc_omitted_by_default() {
        let page = HtmlRenderer.render_page("# One\n\n## Two", &offline_options());
        assert!(!page.contains("<nav class=\"toc\">"));
    }

    #[test]
    fn test_toc_omitted_when_no_headings() {
        let mut options = offline_options();
        options.include_toc = true;
        let page = HtmlRenderer.render_page("just text", &options);
        assert!(!page.contains("<nav class=\"toc\">"));
    }

    #[test]
    fn test_css_can_be_disabled() {
        let mut options = offline_options();
        options.include_css = false;
        let page = HtmlRenderer.render_page("# Hi", &options);
        assert!(!page.contains("<style>"));
    }

    #[test]
    fn test_table_style_appended_to_css() {
        let mut options = offline_options();
        options.table_style = Some("table { border: 2px solid red; }".to_owned());
        let page = HtmlRenderer.render_page("# Hi", &options);
        assert!(page.contains("table { border: 2px solid red; }"));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = HtmlRenderer.render_page("# A <b> & B", &offline_options());
        assert!(page.contains("<title>A &lt;b&gt; &amp; B</title>"));
    }

    #[test]
    fn test_mermaid_script_injected_for_client_side_blocks() {
        let mut options = offline_options();
        options.diagrams.mermaid_server = Some("https://cdn.example.com/mermaid".to_owned());
        let markdown = "# D\n\n```mermaid\ngraph TD;\nA-->B;\n```\n";
        let page = HtmlRenderer.render_page(markdown, &options);
        assert!(page.contains("class=\"mermaid\""));
        assert!(page.contains("import mermaid from 'https://cdn.example.com/mermaid/mermaid.esm.min.mjs';"));
    }

    #[test]
    fn test_no_mermaid_script_without_diagrams() {
        let mut options = offline_options();
        options.diagrams.mermaid_server = Some("https://cdn.example.com/mermaid".to_owned());
        let page = HtmlRenderer.render_page("# No diagrams here", &options);
        assert!(!page.contains("<script type=\"module\">"));
    }

    #[test]
    fn test_render_trait_returns_utf8_bytes() {
        use crate::format::DocumentRenderer;

        let bytes = HtmlRenderer.render("# Hi", &offline_options()).unwrap();
        assert!(bytes.starts_with(b"<!DOCTYPE html>"));
    }
}
