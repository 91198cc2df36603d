use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Logs every request and the status it finished with
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        debug!(
            method = %req.method,
            path = %req.path,
            origin = req.get_header("origin").unwrap_or("-"),
            "Request received"
        );
        None
    }

    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        info!(
            method = %req.method,
            path = %req.path,
            handler = %req.handler_name,
            status = res.status,
            latency_us = latency.as_micros() as u64,
            "Request completed"
        );
    }
}
