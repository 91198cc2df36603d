//! YAML configuration for the CORS policy and logging
//!
//! A service describes its policy in a YAML file and may override the most
//! commonly tuned values from the environment:
//!
//! ```yaml
//! cors:
//!   allowed_origins: ["https://example.com"]
//!   allowed_origin_patterns: ["^https://.*\\.example\\.com$"]
//!   allowed_headers: ["Content-Type"]
//!   allow_credentials: true
//!   expose_headers: ["X-Total-Count"]
//!   max_age: 600
//! logging:
//!   level: info
//!   format: pretty
//! ```
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `BRRTCORS_ALLOWED_ORIGINS` | `cors.allowed_origins` (comma-separated) |
//! | `BRRTCORS_ALLOW_CREDENTIALS` | `cors.allow_credentials` (`true`/`false`) |
//! | `BRRTCORS_MAX_AGE` | `cors.max_age` (seconds, `none` disables) |
//! | `BRRTCORS_LOG_LEVEL` | `logging.level` |
//! | `BRRTCORS_LOG_FORMAT` | `logging.format` |

use std::env;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::middleware::{CorsConfigError, CorsPolicy, CorsPolicyBuilder};
use crate::middleware::cors::DEFAULT_MAX_AGE;
use crate::otel::{LogConfig, LogFormat};

/// Environment variable overriding `cors.allowed_origins`
pub const ENV_ALLOWED_ORIGINS: &str = "BRRTCORS_ALLOWED_ORIGINS";
/// Environment variable overriding `cors.allow_credentials`
pub const ENV_ALLOW_CREDENTIALS: &str = "BRRTCORS_ALLOW_CREDENTIALS";
/// Environment variable overriding `cors.max_age`
pub const ENV_MAX_AGE: &str = "BRRTCORS_MAX_AGE";
/// Environment variable overriding `logging.level`
pub const ENV_LOG_LEVEL: &str = "BRRTCORS_LOG_LEVEL";
/// Environment variable overriding `logging.format`
pub const ENV_LOG_FORMAT: &str = "BRRTCORS_LOG_FORMAT";

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// CORS policy settings
    #[serde(default)]
    pub cors: CorsSettings,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// The `cors:` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorsSettings {
    /// Exact origins, or `["*"]` for any
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Regular expressions matched against the request origin
    #[serde(default)]
    pub allowed_origin_patterns: Vec<String>,
    /// Allowed request headers; absent means any
    #[serde(default)]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(default)]
    pub allow_credentials: bool,
    #[serde(default)]
    pub expose_headers: Vec<String>,
    /// Preflight cache duration in seconds; `null` disables the header
    #[serde(default = "default_max_age")]
    pub max_age: Option<u32>,
}

fn default_max_age() -> Option<u32> {
    Some(DEFAULT_MAX_AGE)
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_origin_patterns: Vec::new(),
            allowed_headers: None,
            allow_credentials: false,
            expose_headers: Vec::new(),
            max_age: default_max_age(),
        }
    }
}

impl CorsSettings {
    /// Validate the settings and build the immutable policy
    ///
    /// # Errors
    ///
    /// Any [`CorsConfigError`] raised by [`CorsPolicyBuilder::build`].
    pub fn to_policy(&self) -> Result<CorsPolicy, CorsConfigError> {
        let origins: Vec<&str> = self.allowed_origins.iter().map(String::as_str).collect();
        let patterns: Vec<&str> = self
            .allowed_origin_patterns
            .iter()
            .map(String::as_str)
            .collect();
        let expose: Vec<&str> = self.expose_headers.iter().map(String::as_str).collect();

        let mut builder = CorsPolicyBuilder::new()
            .allowed_origins(&origins)
            .allowed_origin_patterns(&patterns)
            .allow_credentials(self.allow_credentials)
            .expose_headers(&expose);
        builder = match &self.allowed_headers {
            Some(headers) => {
                let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
                builder.allowed_headers(&headers)
            }
            None => builder.allow_any_header(),
        };
        builder = match self.max_age {
            Some(age) => builder.max_age(age),
            None => builder.no_max_age(),
        };
        builder.build()
    }
}

/// The `logging:` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// trace/debug/info/warn/error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// json/pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingSettings {
    /// Convert to the subscriber configuration used by [`crate::otel::init_logging`]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_level: self.level.clone(),
            format: LogFormat::parse(&self.format),
            target_filter: None,
        }
    }
}

impl AppConfig {
    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Unparseable values are ignored with a warning and the file value kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(origins) = lookup(ENV_ALLOWED_ORIGINS) {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(raw) = lookup(ENV_ALLOW_CREDENTIALS) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => self.cors.allow_credentials = true,
                "false" | "0" | "no" => self.cors.allow_credentials = false,
                _ => warn!(var = ENV_ALLOW_CREDENTIALS, value = %raw, "ignoring invalid boolean"),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_AGE) {
            let raw = raw.trim();
            if raw.eq_ignore_ascii_case("none") {
                self.cors.max_age = None;
            } else {
                match raw.parse::<u32>() {
                    Ok(age) => self.cors.max_age = Some(age),
                    Err(_) => warn!(var = ENV_MAX_AGE, value = %raw, "ignoring invalid max age"),
                }
            }
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = format;
        }
    }
}

/// Parse a configuration document
pub fn parse_config(contents: &str) -> anyhow::Result<AppConfig> {
    serde_yaml::from_str(contents).context("Failed to parse CORS configuration")
}

/// Load a configuration file and apply environment overrides
///
/// # Errors
///
/// Fails when the file cannot be read or is not valid YAML for [`AppConfig`].
/// Policy validation happens later, in [`CorsSettings::to_policy`].
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let mut config: AppConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.apply_env_overrides();
    Ok(config)
}
