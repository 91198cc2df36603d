use std::collections::HashSet;

use regex::Regex;

use super::headers::{parse_header_names, parse_origin};

/// Origin validation strategy
#[derive(Clone)]
pub enum OriginValidation {
    /// Allow every well-formed origin (`*`)
    Wildcard,
    /// Exact origins (normalized, lower-cased) plus optional regex patterns
    List {
        /// Normalized serialized origins
        exact: HashSet<String>,
        /// Patterns matched against the origin as received
        patterns: Vec<Regex>,
    },
}

impl std::fmt::Debug for OriginValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OriginValidation::Wildcard => write!(f, "Wildcard"),
            OriginValidation::List { exact, patterns } => {
                let mut exact: Vec<&String> = exact.iter().collect();
                exact.sort();
                f.debug_struct("List")
                    .field("exact", &exact)
                    .field(
                        "patterns",
                        &patterns.iter().map(Regex::as_str).collect::<Vec<_>>(),
                    )
                    .finish()
            }
        }
    }
}

impl OriginValidation {
    /// Check if a well-formed origin is allowed
    ///
    /// `normalized` is the lower-cased form from [`parse_origin`], `raw` the
    /// header value as received.
    pub(crate) fn is_allowed(&self, normalized: &str, raw: &str) -> bool {
        match self {
            OriginValidation::Wildcard => true,
            OriginValidation::List { exact, patterns } => {
                exact.contains(normalized) || patterns.iter().any(|re| re.is_match(raw))
            }
        }
    }

    /// Check if wildcard is enabled
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, OriginValidation::Wildcard)
    }

    /// Whether no origin can ever match
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            OriginValidation::Wildcard => false,
            OriginValidation::List { exact, patterns } => exact.is_empty() && patterns.is_empty(),
        }
    }
}

/// Which request headers a cross-origin request may carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedHeaders {
    /// Echo back whatever the preflight asks for
    Any,
    /// Lower-cased allow-list
    List(Vec<String>),
}

impl AllowedHeaders {
    /// Build an allow-list, lower-casing and de-duplicating names
    pub(crate) fn list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let lower = name.as_ref().trim().to_ascii_lowercase();
            if !lower.is_empty() && !out.contains(&lower) {
                out.push(lower);
            }
        }
        AllowedHeaders::List(out)
    }

    fn allows(&self, name: &str) -> bool {
        match self {
            AllowedHeaders::Any => true,
            AllowedHeaders::List(list) => list.iter().any(|h| h.eq_ignore_ascii_case(name)),
        }
    }
}

/// Immutable CORS policy
///
/// Built once through [`CorsPolicyBuilder`](super::CorsPolicyBuilder) and shared
/// read-only by every request. Allowed methods are not part of the policy:
/// they come from the routing table for the requested path.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    pub(crate) origins: OriginValidation,
    pub(crate) allowed_headers: AllowedHeaders,
    pub(crate) allow_credentials: bool,
    pub(crate) expose_headers: Vec<String>,
    pub(crate) max_age: Option<u32>,
}

impl CorsPolicy {
    /// Allow every origin and every requested header, without credentials
    ///
    /// Suitable for development and public read-only APIs.
    ///
    /// ```rust
    /// use brrtcors::middleware::CorsPolicy;
    ///
    /// let policy = CorsPolicy::permissive();
    /// assert_eq!(policy.allow_origin_value("https://anything.test").as_deref(), Some("*"));
    /// ```
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            origins: OriginValidation::Wildcard,
            allowed_headers: AllowedHeaders::Any,
            allow_credentials: false,
            expose_headers: Vec::new(),
            max_age: Some(super::DEFAULT_MAX_AGE),
        }
    }

    /// The origin validation strategy
    #[must_use]
    pub fn origins(&self) -> &OriginValidation {
        &self.origins
    }

    /// The request-header allow-list
    #[must_use]
    pub fn allowed_headers(&self) -> &AllowedHeaders {
        &self.allowed_headers
    }

    /// Whether `Access-Control-Allow-Credentials: true` is emitted
    #[must_use]
    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Headers exposed to scripts on decorated responses
    #[must_use]
    pub fn expose_headers(&self) -> &[String] {
        &self.expose_headers
    }

    /// Preflight cache duration in seconds
    #[must_use]
    pub fn max_age(&self) -> Option<u32> {
        self.max_age
    }

    /// The `Access-Control-Allow-Origin` value for a request origin, if allowed
    ///
    /// Returns `*` only for a wildcard policy without credentials; otherwise
    /// the origin exactly as the browser sent it. Malformed origins are denied.
    #[must_use]
    pub fn allow_origin_value(&self, origin: &str) -> Option<String> {
        let normalized = parse_origin(origin)?;
        if !self.origins.is_allowed(&normalized, origin.trim()) {
            return None;
        }
        if self.origins.is_wildcard() && !self.allow_credentials {
            Some("*".to_string())
        } else {
            Some(origin.trim().to_string())
        }
    }

    /// The `Access-Control-Allow-Headers` names for a preflight request
    ///
    /// `requested` is the raw `Access-Control-Request-Headers` value. Returns
    /// `None` if it is malformed, otherwise the requested names this policy
    /// accepts (matched case-insensitively, in request order).
    #[must_use]
    pub fn negotiate_headers(&self, requested: Option<&str>) -> Option<Vec<String>> {
        let Some(requested) = requested else {
            return Some(Vec::new());
        };
        let names = parse_header_names(requested)?;
        Some(
            names
                .into_iter()
                .filter(|n| self.allowed_headers.allows(n))
                .collect(),
        )
    }
}

impl Default for CorsPolicy {
    /// Secure default: no origin is allowed until one is configured
    fn default() -> Self {
        Self {
            origins: OriginValidation::List {
                exact: HashSet::new(),
                patterns: Vec::new(),
            },
            allowed_headers: AllowedHeaders::Any,
            allow_credentials: false,
            expose_headers: Vec::new(),
            max_age: Some(super::DEFAULT_MAX_AGE),
        }
    }
}
