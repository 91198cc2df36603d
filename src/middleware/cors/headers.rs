//! Parsing and merging helpers for the handful of headers CORS reads and writes.

use http::header::VARY;
use http::HeaderName;
use url::Url;

use crate::dispatcher::HandlerResponse;

/// The opaque origin browsers send from sandboxed documents and `file:` pages
pub const NULL_ORIGIN: &str = "null";

/// Normalize a serialized origin, or `None` if the value is not one
///
/// Accepts `scheme://host[:port]` exactly as a browser serializes it, plus the
/// opaque `null` origin. Paths, queries, credentials, lists and explicit
/// default ports are rejected. The result is lower-cased for comparison.
///
/// ```rust
/// use brrtcors::middleware::cors::parse_origin;
///
/// assert_eq!(parse_origin("https://Example.com:8443").as_deref(), Some("https://example.com:8443"));
/// assert_eq!(parse_origin("https://example.com/path"), None);
/// assert_eq!(parse_origin("https://a.com, https://b.com"), None);
/// ```
#[must_use]
pub fn parse_origin(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == NULL_ORIGIN {
        return Some(NULL_ORIGIN.to_string());
    }

    let url = Url::parse(raw).ok()?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return None;
    }

    let serialized = origin.ascii_serialization();
    if serialized.eq_ignore_ascii_case(raw) {
        Some(serialized.to_ascii_lowercase())
    } else {
        None
    }
}

/// Split a comma-separated header-name list such as `Access-Control-Request-Headers`
///
/// Empty items are skipped and duplicates (case-insensitive) dropped, keeping
/// the first spelling. Returns `None` if any item is not a valid header name.
#[must_use]
pub fn parse_header_names(value: &str) -> Option<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if HeaderName::from_bytes(item.as_bytes()).is_err() {
            return None;
        }
        if !names.iter().any(|n| n.eq_ignore_ascii_case(item)) {
            names.push(item.to_string());
        }
    }
    Some(names)
}

/// Add `token` to the response's `Vary` header without clobbering other tokens
///
/// All existing `Vary` values are folded into one header. A `Vary: *`
/// response already varies on everything and is left untouched, as is one that
/// already lists the token.
pub fn merge_vary(res: &mut HandlerResponse, token: &str) {
    let existing = res.get_header_all(VARY.as_str());
    let mut tokens: Vec<String> = existing
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tokens.iter().any(|t| t == "*") {
        return;
    }
    let already_present = tokens.iter().any(|t| t.eq_ignore_ascii_case(token));
    if already_present && existing.len() <= 1 {
        return;
    }
    if !already_present {
        tokens.push(token.to_string());
    }

    let mut merged: Vec<String> = Vec::with_capacity(tokens.len());
    for t in tokens {
        if !merged.iter().any(|m| m.eq_ignore_ascii_case(&t)) {
            merged.push(t);
        }
    }
    res.set_header(VARY.as_str(), merged.join(", "));
}
