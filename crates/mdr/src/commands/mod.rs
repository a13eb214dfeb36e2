//! CLI command implementations.

mod render;
mod serve;

pub(crate) use render::RenderArgs;
pub(crate) use serve::ServeArgs;
