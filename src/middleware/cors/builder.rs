use std::collections::HashSet;

use http::HeaderName;
use regex::Regex;

use super::headers::parse_origin;
use super::{AllowedHeaders, CorsConfigError, CorsPolicy, OriginValidation, DEFAULT_MAX_AGE};

/// Builder for creating a [`CorsPolicy`] with a fluent API
///
/// # Example
///
/// ```rust
/// use brrtcors::middleware::CorsPolicyBuilder;
///
/// let policy = CorsPolicyBuilder::new()
///     .allowed_origins(&["https://example.com", "https://api.example.com"])
///     .allowed_headers(&["Content-Type", "Authorization", "X-Custom-Header"])
///     .allow_credentials(true)
///     .expose_headers(&["X-Total-Count", "X-Page-Number"])
///     .max_age(3600) // Cache preflight for 1 hour
///     .build()
///     .expect("valid CORS configuration");
/// assert!(policy.allow_credentials());
/// ```
#[derive(Debug, Clone)]
pub struct CorsPolicyBuilder {
    allowed_origins: Vec<String>,
    origin_patterns: Vec<String>,
    allowed_headers: Option<Vec<String>>,
    allow_credentials: bool,
    expose_headers: Vec<String>,
    max_age: Option<u32>,
}

impl CorsPolicyBuilder {
    /// Create a new builder with secure defaults
    ///
    /// Default configuration:
    /// - No origins allowed (empty list)
    /// - Any requested header allowed
    /// - Credentials: `false`
    /// - Exposed headers: empty
    /// - Max age: 600 seconds
    pub fn new() -> Self {
        Self {
            allowed_origins: vec![],
            origin_patterns: vec![],
            allowed_headers: None,
            allow_credentials: false,
            expose_headers: vec![],
            max_age: Some(DEFAULT_MAX_AGE),
        }
    }

    /// Set allowed origins
    ///
    /// Use `&["*"]` (or [`allow_any_origin`](Self::allow_any_origin)) to allow
    /// all origins; that cannot be combined with `allow_credentials(true)`.
    pub fn allowed_origins(mut self, origins: &[&str]) -> Self {
        self.allowed_origins = origins.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Allow every origin
    pub fn allow_any_origin(mut self) -> Self {
        self.allowed_origins = vec!["*".to_string()];
        self
    }

    /// Also allow origins matching any of these regular expressions
    ///
    /// Patterns are matched against the `Origin` header as received; anchor
    /// them (`^https://.*\.example\.com$`) to avoid partial matches.
    pub fn allowed_origin_patterns(mut self, patterns: &[&str]) -> Self {
        self.origin_patterns = patterns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Restrict the request headers a cross-origin request may carry
    ///
    /// Matching is case-insensitive. `&["*"]` means any header.
    pub fn allowed_headers(mut self, headers: &[&str]) -> Self {
        if headers.iter().any(|h| h.trim() == "*") {
            self.allowed_headers = None;
        } else {
            self.allowed_headers = Some(headers.iter().map(|s| s.to_string()).collect());
        }
        self
    }

    /// Accept any requested header (the default)
    pub fn allow_any_header(mut self) -> Self {
        self.allowed_headers = None;
        self
    }

    /// Enable or disable credentials
    ///
    /// When enabled, responses carry `Access-Control-Allow-Credentials: true`
    /// and always echo the exact requesting origin.
    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    /// Set headers to expose to JavaScript on non-preflight responses
    pub fn expose_headers(mut self, headers: &[&str]) -> Self {
        self.expose_headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set preflight cache duration in seconds
    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Do not send `Access-Control-Max-Age`
    pub fn no_max_age(mut self) -> Self {
        self.max_age = None;
        self
    }

    /// Validate the configuration and build the policy
    ///
    /// # Errors
    ///
    /// - [`CorsConfigError::WildcardWithCredentials`] for `*` with credentials
    /// - [`CorsConfigError::EmptyOriginsWithCredentials`] if credentials are on
    ///   but nothing could ever match
    /// - [`CorsConfigError::InvalidOriginFormat`] for an origin that is not `scheme://host[:port]`
    /// - [`CorsConfigError::InvalidOriginPattern`] for a pattern that does not compile
    /// - [`CorsConfigError::InvalidHeaderName`] for a bad allowed/exposed header
    pub fn build(self) -> Result<CorsPolicy, CorsConfigError> {
        let wildcard = self.allowed_origins.iter().any(|o| o.trim() == "*");
        if self.allow_credentials && wildcard {
            return Err(CorsConfigError::WildcardWithCredentials);
        }

        let mut exact = HashSet::with_capacity(self.allowed_origins.len());
        for origin in self.allowed_origins.iter().filter(|o| o.trim() != "*") {
            let normalized =
                parse_origin(origin).ok_or_else(|| CorsConfigError::InvalidOriginFormat {
                    origin: origin.clone(),
                })?;
            exact.insert(normalized);
        }

        let mut patterns = Vec::with_capacity(self.origin_patterns.len());
        for pattern in &self.origin_patterns {
            let re = Regex::new(pattern).map_err(|e| CorsConfigError::InvalidOriginPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            patterns.push(re);
        }

        // `*` subsumes every exact origin and pattern once they are known to be valid
        let origins = if wildcard {
            OriginValidation::Wildcard
        } else {
            OriginValidation::List { exact, patterns }
        };

        if self.allow_credentials && origins.is_empty() {
            return Err(CorsConfigError::EmptyOriginsWithCredentials);
        }

        let allowed_headers = match self.allowed_headers {
            None => AllowedHeaders::Any,
            Some(names) => {
                validate_header_names(&names)?;
                AllowedHeaders::list(names)
            }
        };

        validate_header_names(&self.expose_headers)?;
        let mut expose_headers: Vec<String> = Vec::with_capacity(self.expose_headers.len());
        for name in self.expose_headers {
            let name = name.trim().to_string();
            if !expose_headers.iter().any(|h| h.eq_ignore_ascii_case(&name)) {
                expose_headers.push(name);
            }
        }

        Ok(CorsPolicy {
            origins,
            allowed_headers,
            allow_credentials: self.allow_credentials,
            expose_headers,
            max_age: self.max_age,
        })
    }
}

impl Default for CorsPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_header_names(names: &[String]) -> Result<(), CorsConfigError> {
    for name in names {
        if HeaderName::from_bytes(name.trim().as_bytes()).is_err() {
            return Err(CorsConfigError::InvalidHeaderName { name: name.clone() });
        }
    }
    Ok(())
}
