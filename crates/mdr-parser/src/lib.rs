//! Markdown parsing for MDR.
//!
//! This crate converts raw Markdown text into an intermediate
//! [`ParsedDocument`]: an HTML fragment annotated with the metadata the
//! format renderers need but the parsing engine does not surface directly:
//!
//! - the document title (first H1 heading),
//! - table-of-contents entries with unique anchor ids,
//! - table data as plain-text cells (consumed by the Excel renderer).
//!
//! CommonMark parsing is delegated to `pulldown-cmark` with GFM extensions
//! (tables, strikethrough, task lists). Parsing never fails: malformed
//! constructs render as literal text.
//!
//! # Example
//!
//! ```
//! use mdr_parser::MarkdownParser;
//!
//! let doc = MarkdownParser::new().parse("# Title\n\nSome **bold** text");
//! assert_eq!(doc.title.as_deref(), Some("Title"));
//! assert!(doc.html.contains("<strong>bold</strong>"));
//! ```

mod parser;
mod state;

pub use parser::{MarkdownParser, ParsedDocument};
pub use state::{TableData, TocEntry, escape_html, slugify};
