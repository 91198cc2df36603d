//! Router core module - path pattern matching and per-path method lookup.

use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the static route table
/// and are cloned on every match.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A single registered route: one method on one path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    /// HTTP method this route answers
    pub method: Method,
    /// Path pattern, e.g. `/pets/{id}`
    pub path_pattern: String,
    /// Name of the handler registered with the dispatcher
    pub handler_name: String,
}

impl RouteMeta {
    /// Create route metadata
    pub fn new(method: Method, path_pattern: &str, handler_name: &str) -> Self {
        Self {
            method,
            path_pattern: path_pattern.to_string(),
            handler_name: handler_name.to_string(),
        }
    }

    /// Register the same handler for several methods on one path
    ///
    /// ```rust
    /// use brrtcors::router::RouteMeta;
    /// use http::Method;
    ///
    /// let routes = RouteMeta::for_methods(&[Method::POST, Method::OPTIONS], "/info", "set_info");
    /// assert_eq!(routes.len(), 2);
    /// ```
    pub fn for_methods(methods: &[Method], path_pattern: &str, handler_name: &str) -> Vec<Self> {
        methods
            .iter()
            .map(|m| Self::new(m.clone(), path_pattern, handler_name))
            .collect()
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route metadata
    pub route: Arc<RouteMeta>,
    /// Path parameters extracted from the URL (e.g., `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
    /// Name of the handler that should process this request
    pub handler_name: String,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics when a name repeats in the pattern.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    regex: Regex,
    param_names: Vec<Arc<str>>,
    meta: Arc<RouteMeta>,
}

/// Routing table matching `(method, path)` pairs to handlers
///
/// Routes are tried in registration order. The table is immutable once built
/// and is shared between the dispatcher and the CORS middleware, which asks it
/// which methods a path supports when answering preflight requests.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    /// Create a new router from route metadata
    ///
    /// Routes whose pattern cannot be compiled are skipped with a warning.
    #[must_use]
    pub fn new(routes: Vec<RouteMeta>) -> Self {
        let mut compiled = Vec::with_capacity(routes.len());
        for meta in routes {
            match Self::path_to_regex(&meta.path_pattern) {
                Ok((regex, param_names)) => compiled.push(CompiledRoute {
                    regex,
                    param_names: param_names.into_iter().map(Arc::from).collect(),
                    meta: Arc::new(meta),
                }),
                Err(e) => {
                    warn!(
                        method = %meta.method,
                        path_pattern = %meta.path_pattern,
                        error = %e,
                        "Skipping route with invalid path pattern"
                    );
                }
            }
        }

        let routes_summary: Vec<String> = compiled
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.meta.method, r.meta.path_pattern))
            .collect();
        info!(
            routes_count = compiled.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Self { routes: compiled }
    }

    /// Number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no routes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Match an HTTP request to a route
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - If a route with this method matches the path
    /// * `None` - If no route matches (see [`Router::methods_for_path`] to tell 404 from 405)
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let path = strip_query(path);
        for route in &self.routes {
            if route.meta.method != *method {
                continue;
            }
            if let Some(caps) = route.regex.captures(path) {
                let mut path_params = ParamVec::new();
                for (idx, name) in route.param_names.iter().enumerate() {
                    if let Some(value) = caps.get(idx + 1) {
                        path_params.push((Arc::clone(name), value.as_str().to_string()));
                    }
                }
                debug!(
                    method = %method,
                    path = %path,
                    handler_name = %route.meta.handler_name,
                    route_pattern = %route.meta.path_pattern,
                    "Route matched"
                );
                return Some(RouteMatch {
                    route: Arc::clone(&route.meta),
                    path_params,
                    handler_name: route.meta.handler_name.clone(),
                });
            }
        }

        debug!(method = %method, path = %path, "No route matched");
        None
    }

    /// Every method registered for a concrete request path
    ///
    /// Methods are returned in registration order without duplicates. An
    /// empty result means no route pattern matches the path at all.
    ///
    /// ```rust
    /// use brrtcors::router::{RouteMeta, Router};
    /// use http::Method;
    ///
    /// let mut routes = vec![RouteMeta::new(Method::GET, "/info", "get_info")];
    /// routes.extend(RouteMeta::for_methods(&[Method::POST, Method::OPTIONS], "/info", "set_info"));
    /// let router = Router::new(routes);
    /// assert_eq!(router.methods_for_path("/info"), vec![Method::GET, Method::POST, Method::OPTIONS]);
    /// ```
    #[must_use]
    pub fn methods_for_path(&self, path: &str) -> Vec<Method> {
        let path = strip_query(path);
        let mut methods: Vec<Method> = Vec::new();
        for route in &self.routes {
            if route.regex.is_match(path) && !methods.contains(&route.meta.method) {
                methods.push(route.meta.method.clone());
            }
        }
        methods
    }

    /// Convert a path pattern to an anchored regex and extract parameter names
    ///
    /// Transforms `/users/{id}` into `^/users/([^/]+)$` with params `["id"]`.
    /// Literal segments are escaped.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<String>), regex::Error> {
        if path == "/" || path.is_empty() {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 8);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2 {
                param_names.push(segment[1..segment.len() - 1].to_string());
                pattern.push_str("/([^/]+)");
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        if path.ends_with('/') {
            pattern.push('/');
        }
        pattern.push('$');

        Ok((Regex::new(&pattern)?, param_names))
    }
}

fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(p, _)| p)
}
