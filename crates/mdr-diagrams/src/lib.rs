//! Diagram fence resolution for MDR.
//!
//! This crate runs as a pre-pass before markdown parsing: fenced code
//! blocks tagged `mermaid` or `plantuml` are replaced with markup that
//! references a rendered image, or with a clearly marked fallback when
//! rendering is unavailable. Diagram fences must be consumed before
//! CommonMark parsing so they are not treated as generic code fences.
//!
//! # Fallback behavior
//!
//! - `PlantUML`: the source is encoded into a URL on the configured
//!   server (deflate plus the `PlantUML` base64 alphabet). When server
//!   verification is enabled and the server is unreachable, the original
//!   fenced block is left as literal text.
//! - Mermaid: three tiers, each tried once, first success wins:
//!   local CLI renderer (inline PNG), client-side rendering markup
//!   (when a Mermaid asset URL is configured), raw source as a labeled
//!   code block.
//!
//! Degradation never fails the render; it is reported as warnings on
//! the returned [`Resolution`].

mod consts;
mod mermaid;
mod plantuml;
mod resolver;

pub use consts::{DEFAULT_MERMAID_CLI, DEFAULT_PLANTUML_SERVER, MERMAID_CLIENT_CLASS};
pub use mermaid::client_side_markup;
pub use plantuml::{encode_diagram_source, plantuml_url};
pub use resolver::{DiagramConfig, DiagramError, DiagramResolver, Resolution};
