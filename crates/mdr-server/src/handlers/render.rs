//! Render endpoints.
//!
//! `POST /render/{format}` takes a flat JSON body with the markdown and
//! per-request options. `POST /render` takes the format in the body
//! with the same options nested under `options`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use mdr_render::{OutputFormat, RenderError, RenderOptions, render_document};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Per-request render options, shared by both endpoint shapes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OptionsBody {
    pub title: Option<String>,
    pub include_toc: Option<bool>,
    pub include_css: Option<bool>,
    pub fragment: Option<bool>,
    pub table_style: Option<String>,
}

/// Body for POST /render/{format}.
#[derive(Debug, Deserialize)]
pub struct FixedFormatBody {
    pub markdown: Option<String>,
    #[serde(flatten)]
    pub options: OptionsBody,
}

/// Body for POST /render.
#[derive(Debug, Deserialize)]
pub struct AnyFormatBody {
    pub markdown: Option<String>,
    pub format: Option<String>,
    #[serde(default)]
    pub options: OptionsBody,
}

/// Handle POST /render/{format}.
pub async fn render_fixed(
    Path(format): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<FixedFormatBody>,
) -> Result<Response, ApiError> {
    let format: OutputFormat = format.parse().map_err(ApiError::Render)?;
    let markdown = require_markdown(body.markdown)?;
    let options = apply_options(state.base_options(), &body.options);
    render_response(format, markdown, options).await
}

/// Handle POST /render.
pub async fn render_any(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnyFormatBody>,
) -> Result<Response, ApiError> {
    let format: OutputFormat = body
        .format
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("'format' is required".to_owned()))?
        .parse()
        .map_err(ApiError::Render)?;
    let markdown = require_markdown(body.markdown)?;
    let options = apply_options(state.base_options(), &body.options);
    render_response(format, markdown, options).await
}

/// Run the render off the async runtime and shape the response.
async fn render_response(
    format: OutputFormat,
    markdown: String,
    options: RenderOptions,
) -> Result<Response, ApiError> {
    let bytes = tokio::task::spawn_blocking(move || {
        render_document(format, &markdown, &options)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let content_type = [(header::CONTENT_TYPE, format.content_type())];
    if format.is_binary() {
        let disposition = format!("attachment; filename=\"document.{}\"", format.extension());
        Ok((content_type, [(header::CONTENT_DISPOSITION, disposition)], bytes).into_response())
    } else {
        Ok((content_type, bytes).into_response())
    }
}

fn require_markdown(markdown: Option<String>) -> Result<String, ApiError> {
    match markdown {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ApiError::Render(RenderError::InvalidInput(
            "'markdown' is required".to_owned(),
        ))),
    }
}

/// Overlay request options on the configured defaults.
fn apply_options(mut options: RenderOptions, body: &OptionsBody) -> RenderOptions {
    options.title.clone_from(&body.title);
    if let Some(include_toc) = body.include_toc {
        options.include_toc = include_toc;
    }
    if let Some(include_css) = body.include_css {
        options.include_css = include_css;
    }
    if let Some(fragment) = body.fragment {
        options.fragment = fragment;
    }
    options.table_style.clone_from(&body.table_style);
    options
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_require_markdown_rejects_missing() {
        assert!(require_markdown(None).is_err());
        assert!(require_markdown(Some(String::new())).is_err());
        assert_eq!(require_markdown(Some("# hi".to_owned())).unwrap(), "# hi");
    }

    #[test]
    fn test_apply_options_overlays_only_given_fields() {
        let body = OptionsBody {
            title: Some("Report".to_owned()),
            include_toc: Some(true),
            include_css: None,
            fragment: None,
            table_style: None,
        };
        let options = apply_options(RenderOptions::default(), &body);
        assert_eq!(options.title, Some("Report".to_owned()));
        assert!(options.include_toc);
        assert!(options.include_css);
        assert!(!options.fragment);
    }

    #[test]
    fn test_flat_body_parses_options_inline() {
        let body: FixedFormatBody = serde_json::from_str(
            r##"{"markdown": "# Hi", "title": "T", "include_toc": true}"##,
        )
        .unwrap();
        assert_eq!(body.markdown.as_deref(), Some("# Hi"));
        assert_eq!(body.options.title.as_deref(), Some("T"));
        assert_eq!(body.options.include_toc, Some(true));
    }

    #[test]
    fn test_nested_body_parses_options_object() {
        let body: AnyFormatBody = serde_json::from_str(
            r##"{"markdown": "# Hi", "format": "docx", "options": {"table_style": "Light Shading"}}"##,
        )
        .unwrap();
        assert_eq!(body.format.as_deref(), Some("docx"));
        assert_eq!(body.options.table_style.as_deref(), Some("Light Shading"));
    }

    #[test]
    fn test_nested_body_options_default_when_absent() {
        let body: AnyFormatBody =
            serde_json::from_str(r##"{"markdown": "# Hi", "format": "html"}"##).unwrap();
        assert_eq!(body.options.title, None);
        assert_eq!(body.options.include_toc, None);
    }
}
