use std::fmt;

/// CORS configuration error
///
/// Returned by [`CorsPolicyBuilder::build()`](super::CorsPolicyBuilder::build) when the
/// configuration is invalid or would make browsers reject every response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// Wildcard origin (`*`) cannot be used with credentials
    ///
    /// Browsers reject `Access-Control-Allow-Origin: *` on credentialed
    /// requests, so exact origins are required.
    WildcardWithCredentials,
    /// Credentials enabled but no origin (exact or pattern) can ever match
    EmptyOriginsWithCredentials,
    /// Invalid origin format
    ///
    /// The origin string is not a serialized origin (`scheme://host[:port]`) or `null`.
    InvalidOriginFormat {
        /// The invalid origin string
        origin: String,
    },
    /// An origin pattern failed to compile as a regular expression
    InvalidOriginPattern {
        /// The pattern as configured
        pattern: String,
        /// Compiler message
        reason: String,
    },
    /// An allowed or exposed header is not a valid header name
    InvalidHeaderName {
        /// The offending name
        name: String,
    },
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::WildcardWithCredentials => {
                write!(
                    f,
                    "CORS configuration error: Cannot use wildcard origin (*) with credentials. \
                    When allow_credentials is true, you must specify exact origins."
                )
            }
            CorsConfigError::EmptyOriginsWithCredentials => {
                write!(
                    f,
                    "CORS configuration error: Cannot use credentials with empty origins list. \
                    When allow_credentials is true, at least one origin must be specified."
                )
            }
            CorsConfigError::InvalidOriginFormat { origin } => {
                write!(
                    f,
                    "CORS configuration error: Invalid origin format '{}'. \
                    Expected format: scheme://host[:port] (e.g., https://example.com)",
                    origin
                )
            }
            CorsConfigError::InvalidOriginPattern { pattern, reason } => {
                write!(
                    f,
                    "CORS configuration error: Invalid origin pattern '{}': {}",
                    pattern, reason
                )
            }
            CorsConfigError::InvalidHeaderName { name } => {
                write!(
                    f,
                    "CORS configuration error: Invalid header name '{}'",
                    name
                )
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}
