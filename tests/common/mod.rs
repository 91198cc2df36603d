//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use brrtcors::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use brrtcors::middleware::{CorsMiddleware, CorsPolicy, TracingMiddleware};
use brrtcors::router::{RouteMeta, Router};
use http::Method;

pub const ALLOWED: &str = "https://example.com";
pub const EVIL: &str = "https://evil.com";

/// Routing table used across the suites
///
/// - `/info`: POST and OPTIONS, both served by `set_info`
/// - `/pets`: GET
/// - `/pets/{id}`: GET, PUT, DELETE
pub fn routes() -> Vec<RouteMeta> {
    let mut routes = RouteMeta::for_methods(&[Method::POST, Method::OPTIONS], "/info", "set_info");
    routes.push(RouteMeta::new(Method::GET, "/pets", "list_pets"));
    routes.extend(RouteMeta::for_methods(
        &[Method::GET, Method::PUT, Method::DELETE],
        "/pets/{id}",
        "pet",
    ));
    routes
}

/// A dispatcher with handlers for every route and the CORS middleware installed
pub fn app(policy: CorsPolicy) -> Dispatcher {
    let router = Arc::new(Router::new(routes()));
    let mut dispatcher = Dispatcher::new(Arc::clone(&router));

    dispatcher.register_handler("set_info", |req: &HandlerRequest| {
        HandlerResponse::json(
            if req.method == Method::OPTIONS { 204 } else { 201 },
            serde_json::json!({ "handled_by": "set_info", "method": req.method.as_str() }),
        )
    });
    dispatcher.register_handler("list_pets", |_req: &HandlerRequest| {
        HandlerResponse::json(200, serde_json::json!([{ "id": 1, "name": "Rex" }]))
    });
    dispatcher.register_handler("pet", |req: &HandlerRequest| {
        HandlerResponse::json(200, serde_json::json!({ "id": req.get_path_param("id") }))
    });

    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    dispatcher.add_middleware(Arc::new(CorsMiddleware::new(policy, router)));
    dispatcher
}

pub fn preflight(path: &str, origin: &str, method: &str) -> HandlerRequest {
    HandlerRequest::new(Method::OPTIONS, path)
        .with_header("Origin", origin)
        .with_header("Access-Control-Request-Method", method)
}

/// Names of all `access-control-*` headers on a response
pub fn cors_header_names(resp: &HandlerResponse) -> Vec<String> {
    resp.headers
        .iter()
        .map(|(k, _)| k.to_ascii_lowercase())
        .filter(|k| k.starts_with("access-control-"))
        .collect()
}
