mod common;

use brrtcors::dispatcher::HandlerRequest;
use brrtcors::middleware::{CorsPolicy, CorsPolicyBuilder};
use common::{app, cors_header_names, preflight, ALLOWED, EVIL};
use http::Method;

fn credentialed_policy() -> CorsPolicy {
    CorsPolicyBuilder::new()
        .allowed_origins(&[ALLOWED])
        .allow_credentials(true)
        .build()
        .unwrap()
}

#[test]
fn test_request_without_origin_is_untouched() {
    let app = app(credentialed_policy());
    let resp = app.dispatch(HandlerRequest::new(Method::GET, "/pets"));
    assert_eq!(resp.status, 200);
    assert!(cors_header_names(&resp).is_empty());
    assert_eq!(resp.get_header("vary"), None);
}

#[test]
fn test_credentialed_request_echoes_origin() {
    let app = app(credentialed_policy());
    let resp = app.dispatch(HandlerRequest::new(Method::GET, "/pets").with_header("Origin", ALLOWED));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.get_header("access-control-allow-origin"), Some(ALLOWED));
    assert_eq!(resp.get_header("access-control-allow-credentials"), Some("true"));
    assert_eq!(resp.get_header("vary"), Some("Origin"));
    assert_eq!(resp.body[0]["name"], "Rex");
}

#[test]
fn test_wildcard_policy_returns_star() {
    let app = app(CorsPolicy::permissive());
    let resp = app.dispatch(HandlerRequest::new(Method::GET, "/pets").with_header("Origin", EVIL));
    assert_eq!(resp.get_header("access-control-allow-origin"), Some("*"));
    assert_eq!(resp.get_header("access-control-allow-credentials"), None);
}

#[test]
fn test_disallowed_origin_gets_no_cors_headers() {
    let app = app(credentialed_policy());
    let resp = app.dispatch(HandlerRequest::new(Method::GET, "/pets").with_header("Origin", EVIL));
    assert_eq!(resp.status, 200);
    assert!(cors_header_names(&resp).is_empty());
}

#[test]
fn test_preflight_short_circuits_with_route_methods() {
    let app = app(credentialed_policy());
    let resp = app.dispatch(
        preflight("/info", ALLOWED, "POST").with_header("Access-Control-Request-Headers", "Content-Type"),
    );
    assert_eq!(resp.status, 200);
    assert!(resp.is_empty_body());
    assert_eq!(resp.get_header("access-control-allow-methods"), Some("POST, OPTIONS"));
    assert_eq!(resp.get_header("access-control-allow-origin"), Some(ALLOWED));
    assert_eq!(resp.get_header("access-control-allow-headers"), Some("Content-Type"));
    assert_eq!(resp.get_header("access-control-allow-credentials"), Some("true"));
    assert_eq!(resp.get_header("access-control-max-age"), Some("600"));
}

#[test]
fn test_preflight_on_parameterised_path() {
    let app = app(credentialed_policy());
    let resp = app.dispatch(preflight("/pets/42", ALLOWED, "DELETE"));
    assert_eq!(resp.status, 200);
    assert_eq!(
        resp.get_header("access-control-allow-methods"),
        Some("GET, PUT, DELETE")
    );
}

#[test]
fn test_preflight_for_unknown_path_falls_through_to_404() {
    let app = app(credentialed_policy());
    let resp = app.dispatch(preflight("/nowhere", ALLOWED, "GET"));
    assert_eq!(resp.status, 404);
    assert!(cors_header_names(&resp).is_empty());
}

#[test]
fn test_denied_preflight_reaches_options_handler_undecorated() {
    let app = app(credentialed_policy());
    let resp = app.dispatch(preflight("/info", EVIL, "POST"));
    assert_eq!(resp.status, 204);
    assert_eq!(resp.body["handled_by"], "set_info");
    assert!(cors_header_names(&resp).is_empty());
}

#[test]
fn test_denied_preflight_without_options_route_is_405() {
    let app = app(credentialed_policy());
    let resp = app.dispatch(preflight("/pets", EVIL, "GET"));
    assert_eq!(resp.status, 405);
    assert_eq!(resp.get_header("allow"), Some("GET"));
    assert!(cors_header_names(&resp).is_empty());
}

#[test]
fn test_plain_options_is_an_ordinary_request() {
    let app = app(credentialed_policy());
    let resp = app.dispatch(HandlerRequest::new(Method::OPTIONS, "/info").with_header("Origin", ALLOWED));
    assert_eq!(resp.status, 204);
    assert_eq!(resp.body["handled_by"], "set_info");
    assert_eq!(resp.get_header("access-control-allow-origin"), Some(ALLOWED));
    assert_eq!(resp.get_header("access-control-allow-methods"), None);
}

#[test]
fn test_error_responses_are_decorated_for_allowed_origins() {
    let app = app(credentialed_policy());
    let resp = app.dispatch(HandlerRequest::new(Method::GET, "/missing").with_header("Origin", ALLOWED));
    assert_eq!(resp.status, 404);
    assert_eq!(resp.get_header("access-control-allow-origin"), Some(ALLOWED));
}

#[test]
fn test_pattern_origins_end_to_end() {
    let policy = CorsPolicyBuilder::new()
        .allowed_origin_patterns(&[r"^https://[a-z0-9-]+\.example\.com$"])
        .expose_headers(&["X-Total-Count"])
        .build()
        .unwrap();
    let app = app(policy);

    let resp = app.dispatch(
        HandlerRequest::new(Method::GET, "/pets").with_header("Origin", "https://tenant-1.example.com"),
    );
    assert_eq!(
        resp.get_header("access-control-allow-origin"),
        Some("https://tenant-1.example.com")
    );
    assert_eq!(resp.get_header("access-control-expose-headers"), Some("X-Total-Count"));

    let denied = app.dispatch(
        HandlerRequest::new(Method::GET, "/pets").with_header("Origin", "https://example.com.evil.com"),
    );
    assert!(cors_header_names(&denied).is_empty());
}

#[test]
fn test_restricted_headers_are_intersected() {
    let policy = CorsPolicyBuilder::new()
        .allowed_origins(&[ALLOWED])
        .allowed_headers(&["Content-Type", "Authorization"])
        .build()
        .unwrap();
    let app = app(policy);
    let resp = app.dispatch(
        preflight("/info", ALLOWED, "POST")
            .with_header("Access-Control-Request-Headers", "AUTHORIZATION, X-Debug"),
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.get_header("access-control-allow-headers"), Some("AUTHORIZATION"));
}

#[test]
fn test_malformed_preflight_falls_through() {
    let app = app(credentialed_policy());

    let bad_method = app.dispatch(preflight("/info", ALLOWED, "NOT A METHOD"));
    assert_eq!(bad_method.status, 204);
    assert!(cors_header_names(&bad_method).is_empty());

    let bad_headers = app.dispatch(
        preflight("/info", ALLOWED, "POST").with_header("Access-Control-Request-Headers", "x(y)"),
    );
    assert_eq!(bad_headers.status, 204);
    assert!(cors_header_names(&bad_headers).is_empty());
}
