//! # Dispatcher Module
//!
//! The request/response model shared by handlers and middleware, and the
//! [`Dispatcher`] that runs the middleware chain around handler closures.
//!
//! ## Request Flow
//!
//! 1. Middleware `before` hooks run; any of them may answer the request
//!    (the CORS middleware does this for preflight requests)
//! 2. The router resolves the handler from the request method and path
//! 3. The handler produces a [`HandlerResponse`]
//! 4. Middleware `after` hooks decorate the response in place
//!
//! ## Handler Registration
//!
//! ```rust
//! use std::sync::Arc;
//! use brrtcors::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
//! use brrtcors::router::{RouteMeta, Router};
//! use http::Method;
//!
//! let router = Arc::new(Router::new(vec![RouteMeta::new(Method::GET, "/pets/{id}", "get_pet")]));
//! let mut dispatcher = Dispatcher::new(router);
//! dispatcher.register_handler("get_pet", |req: &HandlerRequest| {
//!     HandlerResponse::json(200, serde_json::json!({ "id": req.get_path_param("id") }))
//! });
//!
//! let resp = dispatcher.dispatch(HandlerRequest::new(Method::GET, "/pets/7"));
//! assert_eq!(resp.status, 200);
//! assert_eq!(resp.body["id"], "7");
//! ```
//!
//! ## Error Handling
//!
//! - No route for the path: 404
//! - Path registered for other methods only: 405 with an `Allow` header
//! - Route without a registered handler: 500

mod core;

pub use core::{
    Dispatcher, Handler, HandlerRequest, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS,
};
