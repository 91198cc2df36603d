//! Dispatcher core module - request/response model and the middleware chain.

use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::middleware::Middleware;
use crate::router::{ParamVec, Router};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path
///
/// Header names use `Arc<str>` so repeated names (`content-type`, `vary`, ...)
/// clone in O(1). Values stay `String` as they are per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// A request handler registered with the dispatcher
pub type Handler = Arc<dyn Fn(&HandlerRequest) -> HandlerResponse + Send + Sync>;

/// Request data passed through middleware and to handlers
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path as received, possibly with a query string
    pub path: String,
    /// Name of the matched handler; empty until routing has run
    pub handler_name: String,
    /// Path parameters extracted by the router
    pub path_params: ParamVec,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
}

impl HandlerRequest {
    /// Create a request with no headers
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            handler_name: String::new(),
            path_params: ParamVec::new(),
            headers: HeaderVec::new(),
        }
    }

    /// Builder-style helper appending a header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((Arc::from(name), value.to_string()));
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    ///
    /// Returns the first value when the header is repeated.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get all values of a possibly repeated header
    #[must_use]
    pub fn get_header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response data produced by a handler or by middleware
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON; `Value::Null` means empty
    pub body: Value,
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a response with no headers and an empty body
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::new(status, HeaderVec::new(), Value::Null)
    }

    /// Create a JSON response with a content type header
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Whether the body is empty
    #[must_use]
    pub fn is_empty_body(&self) -> bool {
        self.body.is_null()
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get all values of a possibly repeated header
    #[must_use]
    pub fn get_header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Add or replace a header
    ///
    /// The first entry with that name keeps its position and takes the new
    /// value; any later entries with the same name are dropped.
    pub fn set_header(&mut self, name: &str, value: String) {
        let Some(pos) = self
            .headers
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
        else {
            self.headers.push((Arc::from(name), value));
            return;
        };
        self.headers[pos].1 = value;
        let mut idx = 0;
        self.headers.retain(|(k, _)| {
            let keep = idx <= pos || !k.eq_ignore_ascii_case(name);
            idx += 1;
            keep
        });
    }

    /// Append a header value, keeping existing ones
    pub fn append_header(&mut self, name: &str, value: String) {
        self.headers.push((Arc::from(name), value));
    }
}

/// Dispatcher that runs the middleware chain around registered handlers
///
/// Request flow:
///
/// 1. Every middleware `before` hook runs in order. The first one to return a
///    response short-circuits routing; later hooks still observe the request.
/// 2. Otherwise the router resolves the handler. No matching path gives 404,
///    a path registered only for other methods gives 405 with `Allow`.
/// 3. Every middleware `after` hook runs on the final response.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    /// Map of handler names to handler closures
    pub handlers: HashMap<String, Handler>,
    /// Ordered list of middleware to apply to requests/responses
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    /// Create a dispatcher over a shared routing table
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Dispatcher {
            router,
            handlers: HashMap::new(),
            middlewares: Vec::new(),
        }
    }

    /// The routing table this dispatcher resolves against
    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Register a handler under the name used in the routing table
    ///
    /// Registering a name twice replaces the previous handler.
    pub fn register_handler<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        if self.handlers.contains_key(name) {
            info!(handler_name = %name, "Replacing existing handler");
        }
        self.handlers.insert(name.to_string(), Arc::new(handler));
    }

    /// Append a middleware to the chain
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Dispatch a request through middleware, routing and the handler
    #[must_use]
    pub fn dispatch(&self, mut request: HandlerRequest) -> HandlerResponse {
        let mut early_resp: Option<HandlerResponse> = None;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            if early_resp.is_none() {
                early_resp = mw.before(&request);
                if early_resp.is_some() {
                    debug!(
                        middleware_idx = idx,
                        middleware_name = std::any::type_name_of_val(mw.as_ref()),
                        method = %request.method,
                        path = %request.path,
                        "Middleware returned early response"
                    );
                }
            } else {
                let _ = mw.before(&request);
            }
        }

        let (mut resp, latency) = match early_resp {
            Some(r) => (r, Duration::ZERO),
            None => {
                let start = Instant::now();
                let r = self.route_and_handle(&mut request);
                (r, start.elapsed())
            }
        };

        for mw in &self.middlewares {
            mw.after(&request, &mut resp, latency);
        }

        resp
    }

    fn route_and_handle(&self, request: &mut HandlerRequest) -> HandlerResponse {
        let route_match = match self.router.route(&request.method, &request.path) {
            Some(m) => m,
            None => {
                let allowed = self.router.methods_for_path(&request.path);
                if allowed.is_empty() {
                    return HandlerResponse::error(404, "Not Found");
                }
                let mut resp = HandlerResponse::error(405, "Method Not Allowed");
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                resp.set_header("allow", allow);
                return resp;
            }
        };

        request.handler_name.clone_from(&route_match.handler_name);
        request.path_params = route_match.path_params;

        let Some(handler) = self.handlers.get(&request.handler_name) else {
            error!(
                handler_name = %request.handler_name,
                available_handlers = self.handlers.len(),
                "Handler not found"
            );
            return HandlerResponse::error(500, "Handler not registered");
        };

        info!(
            handler_name = %request.handler_name,
            method = %request.method,
            path = %request.path,
            "Request dispatched to handler"
        );
        handler(request)
    }
}
