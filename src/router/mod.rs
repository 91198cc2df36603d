//! # Router Module
//!
//! Path matching and route resolution for the host pipeline.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Building a routing table from `(method, path pattern, handler)` triples
//! - Matching incoming requests to registered routes
//! - Extracting path parameters from matched routes
//! - Enumerating every method registered for a path, which the CORS
//!   middleware advertises in `Access-Control-Allow-Methods`
//!
//! ## Example
//!
//! ```rust
//! use brrtcors::router::{RouteMeta, Router};
//! use http::Method;
//!
//! let router = Router::new(vec![RouteMeta::new(Method::GET, "/pets/{id}", "get_pet")]);
//!
//! let m = router.route(&Method::GET, "/pets/123").expect("route should match");
//! assert_eq!(m.handler_name, "get_pet");
//! assert_eq!(m.get_path_param("id"), Some("123"));
//! ```

mod core;

pub use core::{ParamVec, RouteMatch, RouteMeta, Router, MAX_INLINE_PARAMS};
