//! Shared state structs for markdown event processing.
//!
//! These structs track context while walking `pulldown-cmark` events:
//! code block buffering, table rendering (including plain-text cell
//! capture), image alt text, and heading/ToC bookkeeping.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block with optional language.
    pub fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (language, content).
    pub fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn push_newline(&mut self) {
        self.buffer.push('\n');
    }
}

/// Table data extracted from a markdown table.
///
/// Cells are plain text with inline markup stripped. Used by the Excel
/// renderer, which needs structured rows rather than HTML.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableData {
    /// Header row cells.
    pub header: Vec<String>,
    /// Body rows.
    pub rows: Vec<Vec<String>>,
}

/// State for tracking table rendering and cell text capture.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    in_cell: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
    cell_text: String,
    current_row: Vec<String>,
    data: TableData,
}

impl TableState {
    /// Start a new table with column alignments.
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.in_cell = false;
        self.cell_index = 0;
        self.cell_text.clear();
        self.current_row.clear();
        self.data = TableData::default();
    }

    /// End the table and return the captured cell data.
    pub fn end(&mut self) -> TableData {
        std::mem::take(&mut self.data)
    }

    pub fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
        self.current_row.clear();
    }

    pub fn end_head(&mut self) {
        self.in_head = false;
        self.data.header = std::mem::take(&mut self.current_row);
    }

    pub fn start_row(&mut self) {
        self.cell_index = 0;
        self.current_row.clear();
    }

    pub fn end_row(&mut self) {
        self.data.rows.push(std::mem::take(&mut self.current_row));
    }

    pub fn start_cell(&mut self) {
        self.in_cell = true;
        self.cell_text.clear();
    }

    /// End the current cell, storing its plain text.
    pub fn end_cell(&mut self) {
        self.in_cell = false;
        self.current_row
            .push(std::mem::take(&mut self.cell_text).trim().to_owned());
        self.cell_index += 1;
    }

    pub fn is_in_head(&self) -> bool {
        self.in_head
    }

    pub fn is_in_cell(&self) -> bool {
        self.in_cell
    }

    /// Append plain text to the current cell buffer.
    pub fn push_text(&mut self, text: &str) {
        self.cell_text.push_str(text);
    }

    /// Get the alignment style for the current cell.
    pub fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
}

impl ImageState {
    pub fn start(&mut self) {
        self.active = true;
        self.alt_text.clear();
    }

    /// End image capture and return the alt text.
    pub fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt_text)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// State for tracking headings, ToC collection, and title extraction.
pub(crate) struct HeadingState {
    /// Extracted title from first H1.
    title: Option<String>,
    /// Current heading level being processed (None if not in a heading).
    current_level: Option<u8>,
    /// Buffer for heading plain text (for the ToC entry and slug).
    text: String,
    /// Buffer for heading HTML (with inline formatting).
    html: String,
    toc: Vec<TocEntry>,
    /// Counter per slug for generating unique heading IDs.
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    pub fn new() -> Self {
        Self {
            title: None,
            current_level: None,
            text: String::new(),
            html: String::new(),
            toc: Vec::new(),
            id_counts: HashMap::new(),
        }
    }

    /// Check if we're currently inside a heading.
    pub fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Complete the current heading and record its ToC entry.
    ///
    /// Returns `(level, id, html)` for the opening/closing tags, or `None`
    /// if no heading is active.
    pub fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);

        let id = self.generate_id(&text);

        // First H1 doubles as the document title but is still rendered.
        if level == 1 && self.title.is_none() {
            self.title = Some(text.trim().to_owned());
        }

        self.toc.push(TocEntry {
            level,
            title: text.trim().to_owned(),
            id: id.clone(),
        });

        Some((level, id, html))
    }

    /// Generate a unique ID for a heading, suffixing a counter on collision.
    fn generate_id(&mut self, text: &str) -> String {
        let base_id = slugify(text);
        let count = self.id_counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }

    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub fn html_buffer(&mut self) -> &mut String {
        &mut self.html
    }

    pub fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// Convert text to a URL-safe slug.
///
/// Lowercases, replaces whitespace/dashes/underscores with single dashes,
/// and drops other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("kebab-case"), "kebab-case");
        assert_eq!(slugify("snake_case"), "snake-case");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_code_block_state() {
        let mut state = CodeBlockState::default();
        assert!(!state.is_active());

        state.start(Some("rust".to_owned()));
        assert!(state.is_active());

        state.push_str("fn main() {}");
        let (lang, content) = state.end();
        assert_eq!(lang, Some("rust".to_owned()));
        assert_eq!(content, "fn main() {}");
        assert!(!state.is_active());
    }

    #[test]
    fn test_table_state_captures_cells() {
        let mut state = TableState::default();
        state.start(vec![Alignment::Left, Alignment::Right]);

        state.start_head();
        state.start_cell();
        state.push_text("Name");
        state.end_cell();
        state.start_cell();
        state.push_text("Age");
        state.end_cell();
        state.end_head();

        state.start_row();
        state.start_cell();
        state.push_text("Alice");
        state.end_cell();
        state.start_cell();
        state.push_text("30");
        state.end_cell();
        state.end_row();

        let data = state.end();
        assert_eq!(data.header, vec!["Name", "Age"]);
        assert_eq!(data.rows, vec![vec!["Alice", "30"]]);
    }

    #[test]
    fn test_table_state_alignment() {
        let mut state = TableState::default();
        state.start(vec![Alignment::Center]);
        state.start_head();
        assert!(state.is_in_head());
        assert_eq!(
            state.current_alignment_style(),
            r#" style="text-align:center""#
        );
        state.end_head();
        assert!(!state.is_in_head());
    }

    #[test]
    fn test_heading_state_title_and_unique_ids() {
        let mut state = HeadingState::new();

        state.start_heading(1);
        state.push_text("My Title");
        let (level, id, _html) = state.complete_heading().unwrap();
        assert_eq!(level, 1);
        assert_eq!(id, "my-title");

        state.start_heading(2);
        state.push_text("FAQ");
        state.complete_heading();
        state.start_heading(2);
        state.push_text("FAQ");
        let (_, id, _) = state.complete_heading().unwrap();
        assert_eq!(id, "faq-1");

        assert_eq!(state.take_title(), Some("My Title".to_owned()));
        assert_eq!(state.take_toc().len(), 3);
    }

    #[test]
    fn test_image_state() {
        let mut state = ImageState::default();
        state.start();
        assert!(state.is_active());
        state.push_str("alt text");
        assert_eq!(state.end(), "alt text");
        assert!(!state.is_active());
    }
}
