//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.tribute.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".tribute.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Summary API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Aggregation limits.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "tribute_report.md".to_string()
}

/// Summary API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the summary endpoint, relative to the base URL.
    #[serde(default = "default_summary_path")]
    pub summary_path: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Bearer token sent with the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            summary_path: default_summary_path(),
            timeout_seconds: default_timeout(),
            token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_summary_path() -> String {
    "/api/v1/reports/summary".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Limits applied when building rankings and the weekly window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Number of most recent weeks to display.
    #[serde(default = "default_week_window")]
    pub week_window: usize,

    /// Number of members in the contributor ranking.
    #[serde(default = "default_top_members")]
    pub top_members: usize,

    /// Number of alliances listed in the report.
    #[serde(default = "default_top_alliances")]
    pub top_alliances: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            week_window: default_week_window(),
            top_members: default_top_members(),
            top_alliances: default_top_alliances(),
        }
    }
}

fn default_week_window() -> usize {
    30
}

fn default_top_members() -> usize {
    15
}

fn default_top_alliances() -> usize {
    10
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the weekly totals section.
    #[serde(default = "default_true")]
    pub include_weekly: bool,

    /// Include the top contributors section.
    #[serde(default = "default_true")]
    pub include_members: bool,

    /// Include the alliance ranking section.
    #[serde(default = "default_true")]
    pub include_alliances: bool,

    /// Include the snapshot drift section.
    #[serde(default = "default_true")]
    pub include_drift: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_weekly: true,
            include_members: true,
            include_alliances: true,
            include_drift: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.tribute.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// where the CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(ref token) = args.token {
            self.api.token = Some(token.clone());
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(window) = args.week_window {
            self.aggregation.week_window = window;
        }
        if let Some(top) = args.top_members {
            self.aggregation.top_members = top;
        }
        if let Some(top) = args.top_alliances {
            self.aggregation.top_alliances = top;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.summary_path, "/api/v1/reports/summary");
        assert_eq!(config.aggregation.week_window, 30);
        assert_eq!(config.aggregation.top_members, 15);
        assert!(config.report.include_drift);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "kingdom.md"

[api]
base_url = "https://kingdom.example"
token = "secret"

[aggregation]
top_members = 20
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "kingdom.md");
        assert_eq!(config.api.base_url, "https://kingdom.example");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.aggregation.top_members, 20);
        assert_eq!(config.aggregation.week_window, 30);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[aggregation]"));
        assert!(toml_str.contains("[report]"));
        assert!(!toml_str.contains("token"));
    }

    #[test]
    fn test_load_from_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(temp_dir.path()).unwrap().is_none());

        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "[aggregation]\nweek_window = 12\n",
        )
        .unwrap();
        let config = Config::load_from_dir(temp_dir.path()).unwrap().unwrap();
        assert_eq!(config.aggregation.week_window, 12);

        std::fs::write(temp_dir.path().join(CONFIG_FILE), "[aggregation\n").unwrap();
        assert!(Config::load_from_dir(temp_dir.path()).is_err());
    }

    #[test]
    fn test_merge_only_overrides_explicit_args() {
        let mut config = Config::default();
        config.aggregation.top_members = 20;
        config.api.base_url = "https://kingdom.example".to_string();

        let mut args = make_args();
        args.week_window = Some(8);
        args.timeout = Some(5);
        config.merge_with_args(&args);

        assert_eq!(config.aggregation.top_members, 20);
        assert_eq!(config.aggregation.week_window, 8);
        assert_eq!(config.api.base_url, "https://kingdom.example");
        assert_eq!(config.api.timeout_seconds, 5);
    }
}
