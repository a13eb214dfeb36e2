//! Format renderers for MDR.
//!
//! Each renderer consumes markdown text plus [`RenderOptions`] and
//! produces a byte payload in its target format:
//!
//! - [`HtmlRenderer`]: styled page template around the parsed fragment
//! - [`PdfRenderer`]: the same styled HTML handed to an external
//!   HTML-to-PDF engine
//! - [`DocxRenderer`]: native Word document elements walked directly
//!   from markdown events
//! - [`ExcelRenderer`]: extracted table data as worksheet rows
//!
//! The renderer set is polymorphic over the [`DocumentRenderer`] trait;
//! [`render_document`] dispatches on [`OutputFormat`].
//!
//! # Example
//!
//! ```
//! use mdr_render::{OutputFormat, RenderOptions, render_document};
//!
//! let mut options = RenderOptions::default();
//! options.diagrams.verify_servers = false;
//! let bytes = render_document(OutputFormat::Html, "# Hello", &options).unwrap();
//! assert!(bytes.starts_with(b"<!DOCTYPE html>"));
//! ```

mod docx;
mod error;
mod format;
mod html;
mod options;
mod pdf;
mod xlsx;

pub use docx::DocxRenderer;
pub use error::RenderError;
pub use format::{DocumentRenderer, OutputFormat, render_document};
pub use html::HtmlRenderer;
pub use options::RenderOptions;
pub use pdf::PdfRenderer;
pub use xlsx::ExcelRenderer;
