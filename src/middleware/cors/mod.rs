//! CORS (Cross-Origin Resource Sharing) middleware
//!
//! The middleware evaluates an immutable [`CorsPolicy`] at two points of the
//! request cycle:
//!
//! 1. **Preflight** (`OPTIONS` carrying `Origin` and
//!    `Access-Control-Request-Method`): an allowed origin gets a terminal
//!    `200` response with CORS headers and an empty body. Anything else falls
//!    through to normal routing without CORS headers, and the browser blocks
//!    the real request on its own.
//! 2. **Actual request**: after the handler ran, an allowed origin gets
//!    `Access-Control-Allow-Origin` (plus credentials / exposed headers) and
//!    `Origin` merged into `Vary`.
//!
//! `Access-Control-Allow-Methods` is not configured. It lists every method
//! the routing table registers for the requested path, whether or not the
//! requested method is among them; enforcement is left to the browser.
//!
//! Denial is silent: no error, no status change, only the absence of headers.
//!
//! ```rust
//! use std::sync::Arc;
//! use brrtcors::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
//! use brrtcors::middleware::{CorsMiddleware, CorsPolicyBuilder};
//! use brrtcors::router::{RouteMeta, Router};
//! use http::Method;
//!
//! let router = Arc::new(Router::new(RouteMeta::for_methods(
//!     &[Method::POST, Method::OPTIONS],
//!     "/info",
//!     "set_info",
//! )));
//! let policy = CorsPolicyBuilder::new()
//!     .allowed_origins(&["https://example.com"])
//!     .allow_credentials(true)
//!     .build()
//!     .expect("valid policy");
//!
//! let mut dispatcher = Dispatcher::new(Arc::clone(&router));
//! dispatcher.register_handler("set_info", |_req: &HandlerRequest| HandlerResponse::empty(204));
//! dispatcher.add_middleware(Arc::new(CorsMiddleware::new(policy, router)));
//!
//! let preflight = HandlerRequest::new(Method::OPTIONS, "/info")
//!     .with_header("Origin", "https://example.com")
//!     .with_header("Access-Control-Request-Method", "POST");
//! let resp = dispatcher.dispatch(preflight);
//! assert_eq!(resp.status, 200);
//! assert_eq!(resp.get_header("access-control-allow-methods"), Some("POST, OPTIONS"));
//! assert_eq!(resp.get_header("access-control-allow-origin"), Some("https://example.com"));
//! ```

mod builder;
mod error;
mod headers;
mod policy;

pub use builder::CorsPolicyBuilder;
pub use error::CorsConfigError;
pub use headers::{merge_vary, parse_header_names, parse_origin, NULL_ORIGIN};
pub use policy::{AllowedHeaders, CorsPolicy, OriginValidation};

use std::sync::Arc;
use std::time::Duration;

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};
use http::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::dispatcher::{HandlerRequest, HandlerResponse, HeaderVec};
use crate::middleware::Middleware;
use crate::router::Router;

/// Preflight cache duration used when none is configured
pub const DEFAULT_MAX_AGE: u32 = 600;

/// CORS policy evaluator plugged into the dispatcher's middleware chain
///
/// Holds the policy and a handle on the routing table used to answer
/// `Access-Control-Allow-Methods`. Both are immutable, so one instance can
/// serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    policy: Arc<CorsPolicy>,
    router: Arc<Router>,
}

impl CorsMiddleware {
    /// Create the middleware from a policy and the routing table it guards
    #[must_use]
    pub fn new(policy: CorsPolicy, router: Arc<Router>) -> Self {
        Self {
            policy: Arc::new(policy),
            router,
        }
    }

    /// Allow-everything middleware for development, see [`CorsPolicy::permissive`]
    #[must_use]
    pub fn permissive(router: Arc<Router>) -> Self {
        Self::new(CorsPolicy::permissive(), router)
    }

    /// The policy being enforced
    #[must_use]
    pub fn policy(&self) -> &CorsPolicy {
        &self.policy
    }

    /// Whether a request is a CORS preflight
    ///
    /// `OPTIONS` with both `Origin` and `Access-Control-Request-Method`
    /// present. A plain `OPTIONS` request is an ordinary request.
    #[must_use]
    pub fn is_preflight(req: &HandlerRequest) -> bool {
        req.method == Method::OPTIONS
            && req.get_header(ORIGIN.as_str()).is_some()
            && req.get_header(ACCESS_CONTROL_REQUEST_METHOD.as_str()).is_some()
    }

    /// Evaluate a preflight request
    ///
    /// # Arguments
    ///
    /// * `origin` - The `Origin` header, if any
    /// * `requested_method` - The `Access-Control-Request-Method` header
    /// * `requested_headers` - The `Access-Control-Request-Headers` header, if any
    /// * `path` - The request path, used to look up registered methods
    ///
    /// # Returns
    ///
    /// * `Some(response)` - Terminal `200` response with CORS headers and an empty body
    /// * `None` - No CORS headers apply; the request continues to normal routing
    #[must_use]
    pub fn evaluate_preflight(
        &self,
        origin: Option<&str>,
        requested_method: &str,
        requested_headers: Option<&str>,
        path: &str,
    ) -> Option<HandlerResponse> {
        let origin = origin?;

        let Some(allow_origin) = self.policy.allow_origin_value(origin) else {
            debug!(origin = %origin, path = %path, "CORS preflight: origin not allowed");
            return None;
        };

        let method_token = requested_method.trim();
        if method_token.is_empty() || method_token.parse::<Method>().is_err() {
            warn!(
                origin = %origin,
                requested_method = %requested_method,
                "CORS preflight: invalid Access-Control-Request-Method"
            );
            return None;
        }

        let methods = self.router.methods_for_path(path);
        if methods.is_empty() {
            debug!(origin = %origin, path = %path, "CORS preflight: no routes for path");
            return None;
        }

        let Some(allowed_headers) = self.policy.negotiate_headers(requested_headers) else {
            warn!(
                origin = %origin,
                requested_headers = requested_headers.unwrap_or_default(),
                "CORS preflight: invalid Access-Control-Request-Headers"
            );
            return None;
        };

        let mut headers = HeaderVec::new();
        headers.push((
            Arc::from(ACCESS_CONTROL_ALLOW_ORIGIN.as_str()),
            allow_origin,
        ));
        headers.push((
            Arc::from(ACCESS_CONTROL_ALLOW_METHODS.as_str()),
            methods
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ));
        if !allowed_headers.is_empty() {
            headers.push((
                Arc::from(ACCESS_CONTROL_ALLOW_HEADERS.as_str()),
                allowed_headers.join(", "),
            ));
        }
        if self.policy.allow_credentials {
            headers.push((
                Arc::from(ACCESS_CONTROL_ALLOW_CREDENTIALS.as_str()),
                "true".to_string(),
            ));
        }
        if let Some(age) = self.policy.max_age {
            headers.push((Arc::from(ACCESS_CONTROL_MAX_AGE.as_str()), age.to_string()));
        }
        headers.push((Arc::from(VARY.as_str()), "Origin".to_string()));

        debug!(
            origin = %origin,
            path = %path,
            requested_method = %requested_method,
            "CORS preflight: allowed"
        );
        Some(HandlerResponse::new(200, headers, Value::Null))
    }

    /// Add CORS headers to a response produced for a non-preflight request
    ///
    /// Leaves the response untouched when the origin is absent, malformed or
    /// not allowed. Never changes status or body. Calling it twice yields the
    /// same headers.
    pub fn decorate_response(&self, origin: Option<&str>, response: &mut HandlerResponse) {
        let Some(origin) = origin else {
            return;
        };
        let Some(allow_origin) = self.policy.allow_origin_value(origin) else {
            debug!(origin = %origin, "CORS: origin not allowed, response left undecorated");
            return;
        };

        response.set_header(ACCESS_CONTROL_ALLOW_ORIGIN.as_str(), allow_origin);
        if self.policy.allow_credentials {
            response.set_header(
                ACCESS_CONTROL_ALLOW_CREDENTIALS.as_str(),
                "true".to_string(),
            );
        }
        if !self.policy.expose_headers.is_empty() {
            response.set_header(
                ACCESS_CONTROL_EXPOSE_HEADERS.as_str(),
                self.policy.expose_headers.join(", "),
            );
        }
        merge_vary(response, "Origin");
    }
}

/// The single `Origin` header of a request
///
/// A repeated header cannot be a valid origin, so it counts as absent.
fn request_origin(req: &HandlerRequest) -> Option<&str> {
    let values = req.get_header_all(ORIGIN.as_str());
    match values.as_slice() {
        [single] => Some(*single),
        [] => None,
        _ => {
            warn!(path = %req.path, count = values.len(), "CORS: multiple Origin headers");
            None
        }
    }
}

impl Middleware for CorsMiddleware {
    /// Answer preflight requests; everything else proceeds to routing
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        if !Self::is_preflight(req) {
            return None;
        }
        let requested_method = req.get_header(ACCESS_CONTROL_REQUEST_METHOD.as_str())?;
        self.evaluate_preflight(
            request_origin(req),
            requested_method,
            req.get_header(ACCESS_CONTROL_REQUEST_HEADERS.as_str()),
            &req.path,
        )
    }

    /// Decorate the final response of a non-preflight request
    ///
    /// Preflight responses are either complete already or deliberately left
    /// un-annotated after a denial.
    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, _latency: Duration) {
        if Self::is_preflight(req) {
            return;
        }
        self.decorate_response(request_origin(req), res);
    }
}
