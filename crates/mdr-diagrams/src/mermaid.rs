//! Mermaid diagram rendering via the local CLI and client-side markup.

use std::process::Command;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use sha2::{Digest, Sha256};

use mdr_parser::escape_html;

use crate::consts::MERMAID_CLIENT_CLASS;
use crate::resolver::DiagramError;

/// Render Mermaid source to PNG bytes with the local CLI renderer.
///
/// Writes the source to a temp file, invokes the CLI
/// (`mmdc -i in.mmd -o out.png -b transparent`), and reads the output.
///
/// # Errors
///
/// Returns an error if the CLI is missing, exits nonzero, or produces
/// no output file.
pub(crate) fn render_with_cli(cli: &str, source: &str) -> Result<Vec<u8>, DiagramError> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("diagram.mmd");
    let output = dir.path().join("diagram.png");
    std::fs::write(&input, source)?;

    let result = Command::new(cli)
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("-b")
        .arg("transparent")
        .output()?;

    if !result.status.success() {
        return Err(DiagramError::CommandFailed {
            command: cli.to_owned(),
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_owned(),
        });
    }

    Ok(std::fs::read(&output)?)
}

/// Build inline image markup for CLI-rendered PNG bytes.
///
/// The PNG is embedded as a base64 data URI so the document remains
/// self-contained. Kept on a single line so the parser treats it as one
/// HTML block.
pub(crate) fn inline_png_markup(png: &[u8]) -> String {
    let data = BASE64_STANDARD.encode(png);
    format!(
        r#"<div class="mermaid-diagram"><img src="data:image/png;base64,{data}" alt="Mermaid diagram"></div>"#
    )
}

/// Build markup for client-side Mermaid rendering.
///
/// Emits a `<pre class="mermaid">` block that a browser-side script
/// renders when the HTML is viewed. The element id is derived from the
/// source hash so identical diagrams share an id prefix deterministically.
#[must_use]
pub fn client_side_markup(source: &str) -> String {
    let hash = Sha256::digest(source.as_bytes());
    let hex = hex_prefix(&hash);
    let id = &hex[..8];
    format!(
        r#"<pre class="{MERMAID_CLIENT_CLASS}" id="mermaid-{id}">{}</pre>"#,
        escape_single_line(source)
    )
}

/// Build fallback markup showing the raw source as a labeled code block.
pub(crate) fn source_fallback_markup(source: &str) -> String {
    format!(
        r#"<pre><code class="language-mermaid">{}</code></pre>"#,
        escape_single_line(source)
    )
}

/// Escape HTML and fold newlines into character references.
///
/// Diagram source may contain blank lines; keeping the markup on a single
/// line prevents the markdown parser from splitting the HTML block.
fn escape_single_line(source: &str) -> String {
    escape_html(source).replace('\n', "&#10;")
}

/// Lowercase hex encoding of hash bytes.
fn hex_prefix(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::new(), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_client_side_markup_shape() {
        let markup = client_side_markup("graph TD;\nA-->B;");
        assert!(markup.starts_with(r#"<pre class="mermaid" id="mermaid-"#));
        assert!(markup.ends_with("</pre>"));
        // Newlines folded, angle brackets escaped
        assert!(markup.contains("&#10;"));
        assert!(markup.contains("A--&gt;B;"));
        assert!(!markup.contains('\n'));
    }

    #[test]
    fn test_client_side_markup_deterministic_id() {
        let a = client_side_markup("graph TD; A-->B;");
        let b = client_side_markup("graph TD; A-->B;");
        assert_eq!(a, b);
    }

    #[test]
    fn test_source_fallback_markup() {
        let markup = source_fallback_markup("sequenceDiagram\nA->>B: hi");
        assert!(markup.contains(r#"<code class="language-mermaid">"#));
        assert!(markup.contains("A-&gt;&gt;B: hi"));
    }

    #[test]
    fn test_inline_png_markup() {
        let markup = inline_png_markup(&[0x89, 0x50, 0x4e, 0x47]);
        assert!(markup.contains("data:image/png;base64,iVBORw=="));
        assert!(markup.contains(r#"class="mermaid-diagram""#));
    }

    #[test]
    fn test_render_with_cli_missing_command() {
        let err = render_with_cli("mdr-test-no-such-renderer", "graph TD; A-->B;");
        assert!(err.is_err());
    }
}
