use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Hooks invoked by the [`Dispatcher`](crate::dispatcher::Dispatcher) around every request.
///
/// `before` runs ahead of routing; returning `Some` answers the request
/// without touching the router or any handler. `after` runs on the final
/// response, whichever component produced it.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
