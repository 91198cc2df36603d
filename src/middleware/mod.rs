mod core;
pub mod cors;
mod tracing;

pub use self::core::Middleware;
pub use self::tracing::TracingMiddleware;
pub use cors::{
    AllowedHeaders, CorsConfigError, CorsMiddleware, CorsPolicy, CorsPolicyBuilder,
    OriginValidation,
};
