//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Tribute - kingdom resource reports from alliance deposit ledgers
///
/// Fetches the reports summary (members, alliances, deposits), aggregates
/// weekly totals and rankings, and writes a Markdown or JSON report.
///
/// Examples:
///   tribute --api-url https://kingdom.example
///   tribute --input summary.json --week-from 10 --week-to 20
///   tribute --input summary.json --search aria --top-members 5 --format json
///   tribute --api-url https://kingdom.example --dry-run
///   tribute --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the backend serving /api/v1/reports/summary
    ///
    /// Overrides [api].base_url from .tribute.toml.
    #[arg(long, value_name = "URL", env = "TRIBUTE_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the summary API
    #[arg(long, value_name = "TOKEN", env = "TRIBUTE_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Read the summary from a JSON file instead of the API
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to [general].output, or tribute_report.md.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .tribute.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// First week to include (inclusive)
    #[arg(long, value_name = "WEEK")]
    pub week_from: Option<u32>,

    /// Last week to include (inclusive)
    ///
    /// A range with --week-from greater than --week-to is kept as given
    /// and matches no deposits.
    #[arg(long, value_name = "WEEK")]
    pub week_to: Option<u32>,

    /// Only include members whose name contains this text (case-insensitive)
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Number of most recent weeks shown in the weekly table
    #[arg(long, value_name = "N")]
    pub week_window: Option<usize>,

    /// Number of members in the contributor ranking
    #[arg(long, value_name = "K")]
    pub top_members: Option<usize>,

    /// Number of alliances in the alliance ranking
    #[arg(long, value_name = "K")]
    pub top_alliances: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Exit with code 2 when no deposits match the filter
    ///
    /// Useful for scheduled jobs that should flag a missing week.
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Dry run: load the summary and print record counts without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .tribute.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.week_window == Some(0) {
            return Err("Week window must be at least 1".to_string());
        }
        if self.top_members == Some(0) {
            return Err("Top members must be at least 1".to_string());
        }
        if self.top_alliances == Some(0) {
            return Err("Top alliances must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    pub(crate) fn make_args() -> Args {
        Args {
            api_url: None,
            token: None,
            input: None,
            output: None,
            config: None,
            verbose: false,
            quiet: false,
            format: OutputFormat::Markdown,
            week_from: None,
            week_to: None,
            search: None,
            week_window: None,
            top_members: None,
            top_alliances: None,
            timeout: None,
            fail_on_empty: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_filter_flags() {
        let args = Args::try_parse_from([
            "tribute",
            "--api-url",
            "https://kingdom.example",
            "--week-from",
            "3",
            "--week-to",
            "9",
            "--search",
            "aria",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.week_from, Some(3));
        assert_eq!(args.week_to, Some(9));
        assert_eq!(args.search.as_deref(), Some("aria"));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.api_url = Some("kingdom.example".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());

        let file = NamedTempFile::new().unwrap();
        args.input = Some(file.path().to_path_buf());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_limits() {
        let mut args = make_args();
        args.top_members = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.week_window = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_inverted_range_is_not_a_validation_error() {
        let mut args = make_args();
        args.week_from = Some(5);
        args.week_to = Some(3);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
