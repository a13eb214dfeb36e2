//! Configuration management for MDR.
//!
//! Parses `mdr.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Precedence, lowest to highest: built-in defaults, config file,
//! environment variables (`PLANTUML_SERVER`, `MERMAID_SERVER`), then
//! CLI settings applied via [`CliSettings`].

use std::path::{Path, PathBuf};

use mdr_diagrams::DiagramConfig;
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdr.toml";

/// Environment variable overriding the `PlantUML` server URL.
pub const PLANTUML_SERVER_VAR: &str = "PLANTUML_SERVER";
/// Environment variable overriding the mermaid script server URL.
pub const MERMAID_SERVER_VAR: &str = "MERMAID_SERVER";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the `PlantUML` server URL.
    pub plantuml_server: Option<String>,
    /// Override the mermaid script server URL.
    pub mermaid_server: Option<String>,
    /// Override the mermaid CLI command.
    pub mermaid_cli: Option<String>,
    /// Override the HTML-to-PDF engine command.
    pub pdf_engine: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Diagram rendering configuration.
    pub diagrams: DiagramsConfig,
    /// PDF engine configuration.
    pub pdf: PdfConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7878,
        }
    }
}

/// Diagram rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// `PlantUML` server base URL.
    pub plantuml_server: String,
    /// Mermaid script server URL for browser-side rendering.
    pub mermaid_server: Option<String>,
    /// Mermaid CLI command; empty string disables the local tier.
    pub mermaid_cli: String,
    /// Verify the `PlantUML` server URL before emitting image references.
    pub verify_servers: bool,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        let defaults = DiagramConfig::default();
        Self {
            plantuml_server: defaults.plantuml_server,
            mermaid_server: None,
            mermaid_cli: defaults.mermaid_cli.unwrap_or_default(),
            verify_servers: defaults.verify_servers,
        }
    }
}

/// PDF engine configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// External HTML-to-PDF engine command.
    pub engine: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            engine: "weasyprint".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `mdr.toml` in the current directory and parents.
    /// Environment variables are applied after loading; CLI settings
    /// are applied last and take precedence over both.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit `config_path` doesn't exist,
    /// parsing fails, or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        config.apply_env_values(
            std::env::var(PLANTUML_SERVER_VAR).ok(),
            std::env::var(MERMAID_SERVER_VAR).ok(),
        );
        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Diagram resolver configuration derived from this config.
    #[must_use]
    pub fn diagram_config(&self) -> DiagramConfig {
        DiagramConfig {
            plantuml_server: self.diagrams.plantuml_server.clone(),
            mermaid_server: self.diagrams.mermaid_server.clone(),
            mermaid_cli: if self.diagrams.mermaid_cli.is_empty() {
                None
            } else {
                Some(self.diagrams.mermaid_cli.clone())
            },
            verify_servers: self.diagrams.verify_servers,
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_values(&mut self, plantuml: Option<String>, mermaid: Option<String>) {
        if let Some(url) = plantuml {
            self.diagrams.plantuml_server = url;
        }
        if let Some(url) = mermaid {
            self.diagrams.mermaid_server = Some(url);
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(url) = &settings.plantuml_server {
            self.diagrams.plantuml_server.clone_from(url);
        }
        if let Some(url) = &settings.mermaid_server {
            self.diagrams.mermaid_server = Some(url.clone());
        }
        if let Some(cli) = &settings.mermaid_cli {
            self.diagrams.mermaid_cli.clone_from(cli);
        }
        if let Some(engine) = &settings.pdf_engine {
            self.pdf.engine.clone_from(engine);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        require_non_empty(&self.diagrams.plantuml_server, "diagrams.plantuml_server")?;
        require_http_url(&self.diagrams.plantuml_server, "diagrams.plantuml_server")?;
        if let Some(url) = &self.diagrams.mermaid_server {
            require_non_empty(url, "diagrams.mermaid_server")?;
            require_http_url(url, "diagrams.mermaid_server")?;
        }

        require_non_empty(&self.pdf.engine, "pdf.engine")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7878);
        assert_eq!(
            config.diagrams.plantuml_server,
            "https://www.plantuml.com/plantuml"
        );
        assert_eq!(config.diagrams.mermaid_server, None);
        assert_eq!(config.diagrams.mermaid_cli, "mmdc");
        assert!(config.diagrams.verify_servers);
        assert_eq!(config.pdf.engine, "weasyprint");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7878);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[diagrams]
plantuml_server = "https://plantuml.internal"
mermaid_server = "https://cdn.internal/mermaid"
mermaid_cli = "npx mmdc"
verify_servers = false

[pdf]
engine = "wkhtmltopdf"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.diagrams.plantuml_server, "https://plantuml.internal");
        assert_eq!(
            config.diagrams.mermaid_server,
            Some("https://cdn.internal/mermaid".to_owned())
        );
        assert_eq!(config.diagrams.mermaid_cli, "npx mmdc");
        assert!(!config.diagrams.verify_servers);
        assert_eq!(config.pdf.engine, "wkhtmltopdf");
    }

    #[test]
    fn test_apply_env_values_override_file() {
        let mut config: Config = toml::from_str(
            r#"
[diagrams]
plantuml_server = "https://from-file"
"#,
        )
        .unwrap();
        config.apply_env_values(
            Some("https://from-env".to_owned()),
            Some("https://mermaid-env".to_owned()),
        );
        assert_eq!(config.diagrams.plantuml_server, "https://from-env");
        assert_eq!(
            config.diagrams.mermaid_server,
            Some("https://mermaid-env".to_owned())
        );
    }

    #[test]
    fn test_apply_env_values_absent_keeps_file() {
        let mut config = Config::default();
        config.apply_env_values(None, None);
        assert_eq!(
            config.diagrams.plantuml_server,
            "https://www.plantuml.com/plantuml"
        );
        assert_eq!(config.diagrams.mermaid_server, None);
    }

    #[test]
    fn test_apply_cli_settings_override_everything() {
        let mut config = Config::default();
        let settings = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(8080),
            plantuml_server: Some("https://uml.local".to_owned()),
            mermaid_server: Some("https://mermaid.local".to_owned()),
            mermaid_cli: Some("mermaid-cli".to_owned()),
            pdf_engine: Some("prince".to_owned()),
        };
        config.apply_cli_settings(&settings);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.diagrams.plantuml_server, "https://uml.local");
        assert_eq!(
            config.diagrams.mermaid_server,
            Some("https://mermaid.local".to_owned())
        );
        assert_eq!(config.diagrams.mermaid_cli, "mermaid-cli");
        assert_eq!(config.pdf.engine, "prince");
    }

    #[test]
    fn test_apply_cli_settings_empty_is_noop() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.pdf.engine, "weasyprint");
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/mdr.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdr.toml");
        std::fs::write(&path, "[server]\nport = 9999\n").unwrap();
        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdr.toml");
        std::fs::write(&path, "[server\nport = 1\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_default_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = Config::default();
        config.server.host = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_validate_port_zero() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_plantuml_scheme() {
        let mut config = Config::default();
        config.diagrams.plantuml_server = "ftp://uml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("plantuml_server"));
    }

    #[test]
    fn test_validate_mermaid_scheme() {
        let mut config = Config::default();
        config.diagrams.mermaid_server = Some("not-a-url".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mermaid_server"));
    }

    #[test]
    fn test_validate_empty_pdf_engine() {
        let mut config = Config::default();
        config.pdf.engine = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pdf.engine"));
    }

    #[test]
    fn test_diagram_config_conversion() {
        let mut config = Config::default();
        config.diagrams.mermaid_server = Some("https://cdn/mermaid".to_owned());
        let diagrams = config.diagram_config();
        assert_eq!(diagrams.plantuml_server, "https://www.plantuml.com/plantuml");
        assert_eq!(diagrams.mermaid_server, Some("https://cdn/mermaid".to_owned()));
        assert_eq!(diagrams.mermaid_cli, Some("mmdc".to_owned()));
        assert!(diagrams.verify_servers);
    }

    #[test]
    fn test_diagram_config_empty_cli_disables_tier() {
        let mut config = Config::default();
        config.diagrams.mermaid_cli = String::new();
        assert_eq!(config.diagram_config().mermaid_cli, None);
    }
}
