//! Constants for diagram resolution.

use std::time::Duration;

/// Default public `PlantUML` server.
pub const DEFAULT_PLANTUML_SERVER: &str = "https://www.plantuml.com/plantuml";

/// Default Mermaid CLI command.
pub const DEFAULT_MERMAID_CLI: &str = "mmdc";

/// CSS class marking a block for client-side Mermaid rendering.
pub const MERMAID_CLIENT_CLASS: &str = "mermaid";

/// Timeout for diagram server requests.
pub(crate) const SERVER_TIMEOUT: Duration = Duration::from_secs(10);
