mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use brrtcors::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use brrtcors::middleware::{CorsMiddleware, CorsPolicy, Middleware, TracingMiddleware};
use brrtcors::router::Router;
use common::{preflight, routes, ALLOWED};
use http::Method;

/// Records what the hooks saw, to check the chain around an early response
#[derive(Default)]
struct Recorder {
    before: AtomicUsize,
    after_status: AtomicUsize,
}

impl Middleware for Recorder {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.before.fetch_add(1, Ordering::SeqCst);
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, _latency: Duration) {
        self.after_status.store(res.status as usize, Ordering::SeqCst);
    }
}

fn dispatcher_with(recorder: Arc<Recorder>) -> Dispatcher {
    let router = Arc::new(Router::new(routes()));
    let mut d = Dispatcher::new(Arc::clone(&router));
    d.register_handler("set_info", |_req: &HandlerRequest| HandlerResponse::empty(204));
    d.add_middleware(Arc::new(CorsMiddleware::permissive(router)));
    d.add_middleware(recorder);
    d.add_middleware(Arc::new(TracingMiddleware));
    d
}

#[test]
fn test_later_hooks_observe_preflight_answer() {
    let recorder = Arc::new(Recorder::default());
    let d = dispatcher_with(Arc::clone(&recorder));

    let resp = d.dispatch(preflight("/info", ALLOWED, "POST"));
    assert_eq!(resp.status, 200);
    assert_eq!(recorder.before.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.after_status.load(Ordering::SeqCst), 200);
}

#[test]
fn test_tracing_middleware_leaves_response_alone() {
    let router = Arc::new(Router::new(routes()));
    let mut d = Dispatcher::new(router);
    d.register_handler("set_info", |_req: &HandlerRequest| HandlerResponse::empty(204));
    d.add_middleware(Arc::new(TracingMiddleware));

    let resp = d.dispatch(HandlerRequest::new(Method::POST, "/info").with_header("Origin", ALLOWED));
    assert_eq!(resp, HandlerResponse::empty(204));
}

#[test]
fn test_middleware_is_shareable_across_threads() {
    let router = Arc::new(Router::new(routes()));
    let cors = Arc::new(CorsMiddleware::new(CorsPolicy::permissive(), router));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cors = Arc::clone(&cors);
            std::thread::spawn(move || {
                let origin = format!("https://client{i}.test");
                cors.before(&preflight("/info", &origin, "POST"))
                    .map(|r| r.status)
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), Some(200));
    }
}
