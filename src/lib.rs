//! # brrtcors
//!
//! **brrtcors** is a CORS (Cross-Origin Resource Sharing) policy evaluator that
//! plugs into a small request pipeline as middleware.
//!
//! ## Overview
//!
//! A [`CorsPolicy`](middleware::CorsPolicy) is built once, validated, and
//! shared read-only by every request. The [`CorsMiddleware`](middleware::CorsMiddleware)
//! evaluates it at two points:
//!
//! - **Preflight** (`OPTIONS` + `Origin` + `Access-Control-Request-Method`):
//!   an allowed origin gets a terminal `200` response with the CORS headers and
//!   an empty body. `Access-Control-Allow-Methods` lists every method the
//!   routing table registers for the path.
//! - **Actual requests**: the handler's response gets
//!   `Access-Control-Allow-Origin` (and credentials / exposed headers) with
//!   `Origin` merged into `Vary`.
//!
//! Denial never produces an error or status change: the CORS headers are
//! simply absent and the browser blocks the response.
//!
//! ## Architecture
//!
//! - **[`middleware`]** - The [`Middleware`](middleware::Middleware) trait, CORS evaluation and request tracing
//! - **[`router`]** - Regex path matching and per-path method lookup
//! - **[`dispatcher`]** - Request/response model and the hook pipeline around handlers
//! - **[`config`]** - YAML configuration with environment overrides
//! - **[`otel`]** - `tracing-subscriber` initialization
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Dispatcher
//!     participant Cors as CorsMiddleware
//!     participant Router
//!     participant Handler
//!
//!     Client->>Dispatcher: dispatch(request)
//!     Dispatcher->>Cors: before(request)
//!     alt allowed preflight
//!         Cors->>Router: methods_for_path(path)
//!         Cors-->>Dispatcher: Some(200 + CORS headers)
//!     else anything else
//!         Cors-->>Dispatcher: None
//!         Dispatcher->>Router: route(method, path)
//!         Dispatcher->>Handler: handler(request)
//!         Handler-->>Dispatcher: response
//!     end
//!     Dispatcher->>Cors: after(request, response)
//!     Cors->>Cors: decorate_response (non-preflight only)
//!     Dispatcher-->>Client: response
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use brrtcors::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
//! use brrtcors::middleware::{CorsMiddleware, CorsPolicyBuilder};
//! use brrtcors::router::{RouteMeta, Router};
//! use http::Method;
//!
//! let router = Arc::new(Router::new(vec![RouteMeta::new(Method::GET, "/pets", "list_pets")]));
//! let policy = CorsPolicyBuilder::new()
//!     .allowed_origins(&["https://app.example.com"])
//!     .build()
//!     .expect("valid CORS configuration");
//!
//! let mut dispatcher = Dispatcher::new(Arc::clone(&router));
//! dispatcher.register_handler("list_pets", |_req: &HandlerRequest| {
//!     HandlerResponse::json(200, serde_json::json!([]))
//! });
//! dispatcher.add_middleware(Arc::new(CorsMiddleware::new(policy, router)));
//!
//! let resp = dispatcher.dispatch(
//!     HandlerRequest::new(Method::GET, "/pets").with_header("Origin", "https://app.example.com"),
//! );
//! assert_eq!(resp.get_header("access-control-allow-origin"), Some("https://app.example.com"));
//! assert_eq!(resp.get_header("vary"), Some("Origin"));
//! ```
//!
//! ## Configuration
//!
//! Policies can also come from a YAML file, see [`config::load_config`].

pub mod config;
pub mod dispatcher;
pub mod middleware;
pub mod otel;
pub mod router;

pub use config::{load_config, AppConfig};
pub use dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
pub use middleware::{CorsConfigError, CorsMiddleware, CorsPolicy, CorsPolicyBuilder};
pub use router::{RouteMeta, Router};
