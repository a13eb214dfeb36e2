//! Output format discriminator and renderer dispatch.

use std::fmt;
use std::str::FromStr;

use crate::docx::DocxRenderer;
use crate::error::RenderError;
use crate::html::HtmlRenderer;
use crate::options::RenderOptions;
use crate::pdf::PdfRenderer;
use crate::xlsx::ExcelRenderer;

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Html,
    Pdf,
    Docx,
    Xlsx,
}

impl OutputFormat {
    /// All supported formats.
    pub const ALL: [Self; 4] = [Self::Html, Self::Pdf, Self::Docx, Self::Xlsx];

    /// MIME content type for the format.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// File extension without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
        }
    }

    /// Whether responses should be delivered as binary attachments.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        !matches!(self, Self::Html)
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(RenderError::InvalidFormat(other.to_owned())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Common renderer contract: markdown text plus options to target bytes.
pub trait DocumentRenderer {
    /// Render markdown into the target format.
    ///
    /// # Errors
    ///
    /// Returns an error when the target encoder or an external engine
    /// fails. Diagram degradation never fails a render.
    fn render(&self, markdown: &str, options: &RenderOptions) -> Result<Vec<u8>, RenderError>;
}

/// Render markdown into the given format.
///
/// Tagged-union dispatch over the four renderer variants.
///
/// # Errors
///
/// See [`DocumentRenderer::render`].
pub fn render_document(
    format: OutputFormat,
    markdown: &str,
    options: &RenderOptions,
) -> Result<Vec<u8>, RenderError> {
    match format {
        OutputFormat::Html => HtmlRenderer.render(markdown, options),
        OutputFormat::Pdf => PdfRenderer.render(markdown, options),
        OutputFormat::Docx => DocxRenderer.render(markdown, options),
        OutputFormat::Xlsx => ExcelRenderer.render(markdown, options),
    }
}
