//! Native Word (DOCX) renderer.
//!
//! Walks markdown events directly into `docx-rs` document elements
//! instead of converting via HTML. Headings map to built-in heading
//! styles, lists to numbering definitions, tables to native Word
//! tables, and resolved diagram images are embedded inline.

use std::io::Cursor;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use docx_rs::{
    AbstractNumbering, AlignmentType, BreakType, Docx, Hyperlink, HyperlinkType, IndentLevel,
    Level, LevelJc, LevelText, NumberFormat, Numbering, NumberingId, Paragraph, Pic, Run, RunFonts,
    Start, Style, StyleType, Table, TableCell, TableRow,
};
use mdr_diagrams::DiagramResolver;
use mdr_parser::MarkdownParser;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;
use tracing::warn;

use crate::error::RenderError;
use crate::format::DocumentRenderer;
use crate::options::RenderOptions;

const MONOSPACE_FONT: &str = "Consolas";
const CODE_SIZE: usize = 20;
const ORDERED_NUM_ID: usize = 2;
const BULLET_NUM_ID: usize = 3;

/// Maximum embedded image width: 6 inches in EMU.
const MAX_IMAGE_WIDTH_EMU: u32 = 5_486_400;
/// EMU per pixel at 96 dpi.
const EMU_PER_PX: u32 = 9525;

static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]*\bsrc="([^"]+)""#).unwrap());
static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<pre><code[^>]*>(.*?)</code></pre>").unwrap());

/// Renders markdown to a Word document.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocxRenderer;

impl DocumentRenderer for DocxRenderer {
    fn render(&self, markdown: &str, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
        // Word has no script runtime, so the browser-side mermaid tier
        // is disabled and resolution falls through to the CLI or the
        // literal-source fallback.
        let mut diagram_config = options.diagrams.clone();
        diagram_config.mermaid_server = None;
        let resolution = DiagramResolver::new(diagram_config).resolve(markdown);
        let parsed = MarkdownParser::default().parse(&resolution.text);
        let title = options.effective_title(parsed.title.as_deref());

        let mut walker = DocxWalker::new(options);
        walker.emit_title(&title);
        walker.walk(&resolution.text);
        let docx = walker.finish();

        let mut cursor = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut cursor)
            .map_err(|e| RenderError::Encoding(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

/// Inline content pending in the current paragraph.
enum Inline {
    Run(Run),
    Link(Hyperlink),
}

/// Plain-text table capture, mirroring the parser's table extraction.
struct TableCapture {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    current_row: Vec<String>,
    cell: String,
    in_head: bool,
}

/// Event walker accumulating document elements.
struct DocxWalker<'a> {
    options: &'a RenderOptions,
    docx: Docx,
    inlines: Vec<Inline>,
    text: String,
    bold: bool,
    italic: bool,
    strike: bool,
    paragraph_style: Option<&'static str>,
    quote_depth: usize,
    list_stack: Vec<usize>,
    link: Option<Hyperlink>,
    table: Option<TableCapture>,
    code_block: Option<String>,
    image_alt: Option<String>,
}

impl<'a> DocxWalker<'a> {
    fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            docx: base_document(),
            inlines: Vec::new(),
            text: String::new(),
            bold: false,
            italic: false,
            strike: false,
            paragraph_style: None,
            quote_depth: 0,
            list_stack: Vec::new(),
            link: None,
            table: None,
            code_block: None,
            image_alt: None,
        }
    }

    /// Document title as a centered, Title-styled paragraph.
    fn emit_title(&mut self, title: &str) {
        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text(title))
            .style("Title")
            .align(AlignmentType::Center);
        self.docx = std::mem::take(&mut self.docx).add_paragraph(paragraph);
    }

    fn walk(&mut self, markdown: &str) {
        let parser = Parser::new_ext(markdown, MarkdownParser::default().options());
        for event in parser {
            self.handle(&event);
        }
    }

    fn finish(mut self) -> Docx {
        self.flush_paragraph();
        self.docx
    }

    fn handle(&mut self, event: &Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(*tag),
            Event::Text(text) => {
                if let Some(code) = &mut self.code_block {
                    code.push_str(text);
                } else if let Some(table) = &mut self.table {
                    table.cell.push_str(text);
                } else if let Some(alt) = &mut self.image_alt {
                    alt.push_str(text);
                } else {
                    self.text.push_str(text);
                }
            }
            Event::Code(code) => {
                if let Some(table) = &mut self.table {
                    table.cell.push_str(code);
                } else {
                    self.flush_run();
                    self.push_run(code_run(code));
                }
            }
            Event::SoftBreak => {
                if self.table.is_some() {
                    self.handle(&Event::Text(" ".into()));
                } else {
                    self.text.push(' ');
                }
            }
            Event::HardBreak => {
                self.flush_run();
                self.push_run(Run::new().add_break(BreakType::TextWrapping));
            }
            Event::Rule => {
                self.flush_paragraph();
                self.docx = std::mem::take(&mut self.docx)
                    .add_paragraph(Paragraph::new().add_run(Run::new().add_text("\u{2500}".repeat(30))));
            }
            Event::TaskListMarker(checked) => {
                let marker = if *checked { "\u{2611} " } else { "\u{2610} " };
                self.text.push_str(marker);
            }
            Event::Html(html) | Event::InlineHtml(html) => self.handle_html(html),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.flush_paragraph();
                self.paragraph_style = Some(heading_style_id(*level as usize));
            }
            Tag::BlockQuote(_) => {
                self.flush_paragraph();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush_paragraph();
                self.code_block = Some(String::new());
            }
            Tag::List(start) => {
                self.flush_paragraph();
                let id = if start.is_some() { ORDERED_NUM_ID } else { BULLET_NUM_ID };
                self.list_stack.push(id);
            }
            Tag::Item => self.flush_paragraph(),
            Tag::Table(_) => {
                self.flush_paragraph();
                self.table = Some(TableCapture {
                    header: Vec::new(),
                    rows: Vec::new(),
                    current_row: Vec::new(),
                    cell: String::new(),
                    in_head: false,
                });
            }
            Tag::TableHead => {
                if let Some(table) = &mut self.table {
                    table.in_head = true;
                }
            }
            Tag::TableRow => {
                if let Some(table) = &mut self.table {
                    table.current_row.clear();
                }
            }
            Tag::TableCell => {
                if let Some(table) = &mut self.table {
                    table.cell.clear();
                }
            }
            Tag::Emphasis => {
                self.flush_run();
                self.italic = true;
            }
            Tag::Strong => {
                self.flush_run();
                self.bold = true;
            }
            Tag::Strikethrough => {
                self.flush_run();
                self.strike = true;
            }
            Tag::Link { dest_url, .. } => {
                self.flush_run();
                self.link = Some(Hyperlink::new(dest_url.as_ref(), HyperlinkType::External));
            }
            Tag::Image { dest_url, .. } => {
                self.flush_run();
                self.image_alt = Some(String::new());
                self.embed_image(dest_url);
            }
            Tag::HtmlBlock
            | Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::MetadataBlock(_)
            | Tag::Superscript
            | Tag::Subscript => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item => self.flush_paragraph(),
            TagEnd::BlockQuote(_) => {
                self.flush_paragraph();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code_block.take() {
                    self.emit_code_block(&code);
                }
            }
            TagEnd::List(_) => {
                self.flush_paragraph();
                self.list_stack.pop();
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.emit_table(&table);
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    table.header = std::mem::take(&mut table.current_row);
                    table.in_head = false;
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table
                    && !table.in_head
                {
                    let row = std::mem::take(&mut table.current_row);
                    table.rows.push(row);
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = &mut self.table {
                    let cell = std::mem::take(&mut table.cell);
                    table.current_row.push(cell.trim().to_owned());
                }
            }
            TagEnd::Emphasis => {
                self.flush_run();
                self.italic = false;
            }
            TagEnd::Strong => {
                self.flush_run();
                self.bold = false;
            }
            TagEnd::Strikethrough => {
                self.flush_run();
                self.strike = false;
            }
            TagEnd::Link => {
                self.flush_run();
                if let Some(link) = self.link.take() {
                    self.inlines.push(Inline::Link(link));
                }
            }
            TagEnd::Image => {
                // Alt text was consumed by the embed; drop it.
                self.image_alt = None;
            }
            TagEnd::HtmlBlock
            | TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::MetadataBlock(_)
            | TagEnd::Superscript
            | TagEnd::Subscript => {}
        }
    }

    /// Resolver output arrives as raw HTML blocks; pick out embedded
    /// images and literal-source code fallbacks.
    fn handle_html(&mut self, html: &str) {
        if let Some(caps) = IMG_SRC_RE.captures(html) {
            self.flush_run();
            self.embed_image(&caps[1]);
            return;
        }
        if let Some(caps) = CODE_BLOCK_RE.captures(html) {
            self.flush_paragraph();
            let code = unescape_entities(&caps[1]);
            self.emit_code_block(&code);
        }
    }

    /// Fold the pending text into a run with the current inline flags.
    fn flush_run(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let mut run = Run::new().add_text(std::mem::take(&mut self.text));
        if self.bold {
            run = run.bold();
        }
        if self.italic {
            run = run.italic();
        }
        if self.strike {
            run = run.strike();
        }
        self.push_run(run);
    }

    fn push_run(&mut self, run: Run) {
        if let Some(link) = self.link.take() {
            self.link = Some(link.add_run(run));
        } else {
            self.inlines.push(Inline::Run(run));
        }
    }

    fn flush_paragraph(&mut self) {
        self.flush_run();
        if self.inlines.is_empty() {
            self.paragraph_style = None;
            return;
        }

        let mut paragraph = Paragraph::new();
        for inline in self.inlines.drain(..) {
            paragraph = match inline {
                Inline::Run(run) => paragraph.add_run(run),
                Inline::Link(link) => paragraph.add_hyperlink(link),
            };
        }
        if let Some(style) = self.paragraph_style.take() {
            paragraph = paragraph.style(style);
        } else if self.quote_depth > 0 {
            paragraph = paragraph.style("Quote");
        }
        if let Some(id) = self.list_stack.last() {
            let depth = self.list_stack.len() - 1;
            paragraph = paragraph.numbering(NumberingId::new(*id), IndentLevel::new(depth));
        }
        self.docx = std::mem::take(&mut self.docx).add_paragraph(paragraph);
    }

    fn emit_code_block(&mut self, code: &str) {
        let mut run = Run::new()
            .fonts(RunFonts::new().ascii(MONOSPACE_FONT))
            .size(CODE_SIZE);
        let mut first = true;
        for line in code.trim_end_matches('\n').lines() {
            if !first {
                run = run.add_break(BreakType::TextWrapping);
            }
            run = run.add_text(line);
            first = false;
        }
        self.docx = std::mem::take(&mut self.docx).add_paragraph(Paragraph::new().add_run(run));
    }

    fn emit_table(&mut self, capture: &TableCapture) {
        let mut rows = Vec::with_capacity(capture.rows.len() + 1);
        if !capture.header.is_empty() {
            let cells = capture
                .header
                .iter()
                .map(|text| {
                    TableCell::new()
                        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text).bold()))
                })
                .collect();
            rows.push(TableRow::new(cells));
        }
        for row in &capture.rows {
            let cells = row
                .iter()
                .map(|text| {
                    TableCell::new()
                        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
                })
                .collect();
            rows.push(TableRow::new(cells));
        }

        let table = Table::new(rows).style(table_style_id(self.options.table_style.as_deref()));
        self.docx = std::mem::take(&mut self.docx).add_table(table);
    }

    /// Fetch and embed an image, falling back to its URL as text.
    fn embed_image(&mut self, src: &str) {
        match fetch_image(src) {
            Ok(bytes) => {
                let mut pic = Pic::new(&bytes);
                if let Some((width, height)) = png_dimensions(&bytes) {
                    let (w_emu, h_emu) = scaled_emu(width, height);
                    pic = pic.size(w_emu, h_emu);
                }
                self.push_run(Run::new().add_image(pic));
            }
            Err(message) => {
                warn!(src, message, "image embed failed, keeping reference text");
                self.push_run(Run::new().add_text(src).italic());
            }
        }
    }
}

/// Document skeleton with title/heading styles and list numbering.
fn base_document() -> Docx {
    let mut docx = Docx::new()
        .add_style(
            Style::new("Title", StyleType::Paragraph)
                .name("Title")
                .size(56)
                .bold(),
        )
        .add_style(
            Style::new("Quote", StyleType::Paragraph)
                .name("Quote")
                .italic(),
        );
    for (index, size) in [48, 36, 28, 24, 22, 20].iter().enumerate() {
        let level = index + 1;
        docx = docx.add_style(
            Style::new(format!("Heading{level}"), StyleType::Paragraph)
                .name(format!("Heading {level}"))
                .size(*size)
                .bold(),
        );
    }

    let mut ordered = AbstractNumbering::new(ORDERED_NUM_ID);
    let mut bullet = AbstractNumbering::new(BULLET_NUM_ID);
    for level in 0..4_usize {
        let indent = i32::try_from(720 * (level + 1)).unwrap_or(720);
        ordered = ordered.add_level(
            Level::new(
                level,
                Start::new(1),
                NumberFormat::new("decimal"),
                LevelText::new(format!("%{}.", level + 1)),
                LevelJc::new("left"),
            )
            .indent(Some(indent), None, None, None),
        );
        bullet = bullet.add_level(
            Level::new(
                level,
                Start::new(1),
                NumberFormat::new("bullet"),
                LevelText::new("\u{2022}"),
                LevelJc::new("left"),
            )
            .indent(Some(indent), None, None, None),
        );
    }
    docx.add_abstract_numbering(ordered)
        .add_abstract_numbering(bullet)
        .add_numbering(Numbering::new(ORDERED_NUM_ID, ORDERED_NUM_ID))
        .add_numbering(Numbering::new(BULLET_NUM_ID, BULLET_NUM_ID))
}

fn heading_style_id(level: usize) -> &'static str {
    match level {
        1 => "Heading1",
        2 => "Heading2",
        3 => "Heading3",
        4 => "Heading4",
        5 => "Heading5",
        _ => "Heading6",
    }
}

/// Word style id for a display name ("Table Grid" -> "TableGrid").
fn table_style_id(name: Option<&str>) -> String {
    name.unwrap_or("Table Grid").replace(' ', "")
}

fn code_run(code: &str) -> Run {
    Run::new()
        .add_text(code)
        .fonts(RunFonts::new().ascii(MONOSPACE_FONT))
        .size(CODE_SIZE)
}

/// Fetch image bytes from a data URI, an HTTP URL, or the filesystem.
fn fetch_image(src: &str) -> Result<Vec<u8>, String> {
    if let Some(encoded) = src
        .strip_prefix("data:image/png;base64,")
        .or_else(|| src.strip_prefix("data:image/svg+xml;base64,"))
    {
        return BASE64.decode(encoded).map_err(|e| e.to_string());
    }
    if src.starts_with("http://") || src.starts_with("https://") {
        let mut response = ureq::get(src).call().map_err(|e| e.to_string())?;
        return response
            .body_mut()
            .read_to_vec()
            .map_err(|e| e.to_string());
    }
    std::fs::read(src).map_err(|e| e.to_string())
}

/// Pixel dimensions from a PNG IHDR chunk.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < 24 || !bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return None;
    }
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    Some((width, height))
}

/// Pixel size to EMU, capped at the maximum page-content width.
fn scaled_emu(width_px: u32, height_px: u32) -> (u32, u32) {
    let width = width_px.saturating_mul(EMU_PER_PX);
    let height = height_px.saturating_mul(EMU_PER_PX);
    if width <= MAX_IMAGE_WIDTH_EMU || width == 0 {
        return (width, height);
    }
    let scaled_height = (u64::from(height) * u64::from(MAX_IMAGE_WIDTH_EMU) / u64::from(width))
        .try_into()
        .unwrap_or(u32::MAX);
    (MAX_IMAGE_WIDTH_EMU, scaled_height)
}

/// Undo the resolver's single-line HTML escaping.
fn unescape_entities(text: &str) -> String {
    text.replace("&#10;", "\n")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use std::io::Read as _;

    use mdr_diagrams::DiagramConfig;
    use pretty_assertions::assert_eq;

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

    /// Unpack the archive and return the main document part.
    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_render_produces_zip_container() {
        let markdown = "# Title\n\nSome **bold** and *italic* text.\n\n- one\n- two\n";
        let bytes = DocxRenderer.render(markdown, &offline_options()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_title_option_leads_document() {
        let options = RenderOptions {
            title: Some("Quarterly Report".to_owned()),
            ..offline_options()
        };
        let bytes = DocxRenderer.render("plain body text\n", &options).unwrap();
        let xml = document_xml(&bytes);
        assert!(xml.contains("Quarterly Report"));
        assert!(xml.contains(r#"w:val="Title""#));
    }

    #[test]
    fn test_title_falls_back_to_first_heading() {
        let bytes = DocxRenderer
            .render("# Release Notes\n\nbody\n", &offline_options())
            .unwrap();
        let xml = document_xml(&bytes);
        assert!(xml.contains(r#"w:val="Title""#));
        // Once as the title paragraph, once as the heading itself.
        assert_eq!(xml.matches("Release Notes").count(), 2);
    }

    #[test]
    fn test_named_table_style_is_applied() {
        let markdown = "\
1. first
2. second

| A | B |
|---|---|
| 1 | 2 |
";
        let options = RenderOptions {
            table_style: Some("Light Shading".to_owned()),
            ..offline_options()
        };
        let bytes = DocxRenderer.render(markdown, &options).unwrap();
        assert!(document_xml(&bytes).contains(r#"w:val="LightShading""#));
    }

    #[test]
    fn test_default_table_style_is_table_grid() {
        let markdown = "| A | B |\n|---|---|\n| 1 | 2 |\n";
        let bytes = DocxRenderer.render(markdown, &offline_options()).unwrap();
        assert!(document_xml(&bytes).contains(r#"w:val="TableGrid""#));
    }

    #[test]
    fn test_render_with_table_and_code() {
        let markdown = "\
# Doc

| A | B |
|---|---|
| 1 | 2 |

```rust
fn main() {}
```
";
        let bytes = DocxRenderer.render(markdown, &offline_options()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_table_style_id_default() {
        assert_eq!(table_style_id(None), "TableGrid");
    }

    #[test]
    fn test_table_style_id_strips_spaces() {
        assert_eq!(table_style_id(Some("Light Shading Accent 1")), "LightShadingAccent1");
    }

    #[test]
    fn test_png_dimensions_from_header() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"\x89PNG\r\n\x1a\n");
        bytes.extend_from_slice(&[0, 0, 0, 13]);
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&640_u32.to_be_bytes());
        bytes.extend_from_slice(&480_u32.to_be_bytes());
        assert_eq!(png_dimensions(&bytes), Some((640, 480)));
    }

    #[test]
    fn test_png_dimensions_rejects_other_bytes() {
        assert_eq!(png_dimensions(b"GIF89a"), None);
        assert_eq!(png_dimensions(b""), None);
    }

    #[test]
    fn test_scaled_emu_keeps_small_images() {
        assert_eq!(scaled_emu(100, 50), (952_500, 476_250));
    }

    #[test]
    fn test_scaled_emu_caps_wide_images() {
        let (width, height) = scaled_emu(1200, 600);
        assert_eq!(width, MAX_IMAGE_WIDTH_EMU);
        assert_eq!(height, MAX_IMAGE_WIDTH_EMU / 2);
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(
            unescape_entities("a &lt;b&gt; c&#10;&quot;d&quot; &amp; &#x27;e&#x27;"),
            "a <b> c\n\"d\" & 'e'"
        );
    }

    #[test]
    fn test_fetch_image_data_uri() {
        let bytes = fetch_image("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_fetch_image_bad_data_uri() {
        assert!(fetch_image("data:image/png;base64,!!!").is_err());
    }
}
