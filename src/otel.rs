//! Structured logging initialization
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] and either
//! JSON lines (production) or pretty output (development). `RUST_LOG`, when
//! set, takes precedence over the configured level.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json, // Default to JSON
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Extra filter directives (comma-separated), e.g. `brrtcors::router=warn`
    pub target_filter: Option<String>,
}

impl LogConfig {
    /// Default configuration with the `BRRTCORS_LOG_*` overrides applied
    ///
    /// Overrides are resolved by [`AppConfig::apply_env_overrides`], the same
    /// path [`crate::config::load_config`] uses.
    pub fn from_env() -> Self {
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        config.logging.to_log_config()
    }

    /// Verbose pretty output for local development and tests
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
        }
    }

    /// Build the filter this configuration describes
    pub fn env_filter(&self) -> EnvFilter {
        let level = parse_level(&self.log_level);
        let mut env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                match filter.parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {filter}"),
                }
            }
        }
        env_filter
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use brrtcors::otel::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(true))
            .try_init(),
    };

    result.map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Json);
    }

    #[test]
    fn test_parse_level_falls_back_to_info() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_target_filter_directives_are_added() {
        let config = LogConfig {
            target_filter: Some("brrtcors::router=warn, not a directive ,".to_string()),
            ..LogConfig::default()
        };
        assert!(config
            .env_filter()
            .to_string()
            .contains("brrtcors::router=warn"));
    }

    // Only test in this binary that installs the global subscriber
    #[test]
    fn test_second_init_fails() {
        let config = LogConfig::default_dev();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_err());
    }
}
