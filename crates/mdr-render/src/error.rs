//! Render error types.

/// Error from a render operation.
///
/// Diagram-resolution degradation is deliberately absent: it is absorbed
/// by the resolver's fallback chain and logged, never surfaced as a
/// failure.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Unsupported output format discriminator.
    #[error("unsupported format: '{0}' (supported: html, pdf, docx, xlsx)")]
    InvalidFormat(String),

    /// Missing or malformed input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The external HTML-to-PDF engine failed.
    #[error("PDF engine '{command}' failed: {message}")]
    PdfEngine { command: String, message: String },

    /// The DOCX/XLSX encoding engine failed.
    #[error("document encoding failed: {0}")]
    Encoding(String),

    /// I/O error (temp files, output files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
