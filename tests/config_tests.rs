mod common;

use std::io::Write;

use brrtcors::config::{load_config, AppConfig};
use brrtcors::dispatcher::HandlerRequest;
use brrtcors::middleware::CorsConfigError;
use brrtcors::otel::LogFormat;
use common::{app, preflight, ALLOWED};
use http::Method;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_yaml_file_drives_the_pipeline() {
    let file = write_config(
        r#"
cors:
  allowed_origins: ["https://example.com"]
  allowed_headers: ["Content-Type"]
  allow_credentials: true
  expose_headers: ["X-Total-Count"]
  max_age: 3600
logging:
  level: debug
  format: pretty
"#,
    );
    let config = load_config(file.path()).unwrap();
    let log = config.logging.to_log_config();
    assert_eq!(log.format, LogFormat::Pretty);

    let app = app(config.cors.to_policy().unwrap());

    let pre = app.dispatch(
        preflight("/info", ALLOWED, "POST")
            .with_header("Access-Control-Request-Headers", "content-type, x-other"),
    );
    assert_eq!(pre.status, 200);
    assert_eq!(pre.get_header("access-control-max-age"), Some("3600"));
    assert_eq!(pre.get_header("access-control-allow-headers"), Some("content-type"));

    let resp = app.dispatch(HandlerRequest::new(Method::GET, "/pets").with_header("Origin", ALLOWED));
    assert_eq!(resp.get_header("access-control-allow-credentials"), Some("true"));
    assert_eq!(resp.get_header("access-control-expose-headers"), Some("X-Total-Count"));
}

#[test]
fn test_missing_file_is_an_error_with_path() {
    let err = load_config(std::path::Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here.yaml"));
}

#[test]
fn test_malformed_yaml_is_an_error() {
    let file = write_config("cors: [not, a, mapping");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_invalid_policy_is_reported_after_loading() {
    let file = write_config("cors:\n  allow_credentials: true\n");
    let config: AppConfig = load_config(file.path()).unwrap();
    assert_eq!(
        config.cors.to_policy().unwrap_err(),
        CorsConfigError::EmptyOriginsWithCredentials
    );
}

#[test]
fn test_error_messages_name_the_offending_value() {
    let file = write_config("cors:\n  allowed_origins: ['https://example.com/app']\n");
    let err = load_config(file.path()).unwrap().cors.to_policy().unwrap_err();
    assert!(err.to_string().contains("https://example.com/app"));
}

#[test]
fn test_wildcard_config_still_validates_patterns() {
    let file = write_config("cors:\n  allowed_origins: ['*']\n  allowed_origin_patterns: ['(unclosed']\n");
    let err = load_config(file.path()).unwrap().cors.to_policy().unwrap_err();
    assert!(matches!(err, CorsConfigError::InvalidOriginPattern { .. }));
}
