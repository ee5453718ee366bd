use std::time::Duration;

use tracing::{debug, info, info_span};

use super::Middleware;
use crate::binding::BoundRequest;
use crate::dispatcher::HandlerResponse;

/// Logs every dispatched request with its route, status and latency.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &BoundRequest) -> Option<HandlerResponse> {
        debug!(
            request_id = %req.request_id,
            method = %req.route.method,
            route_pattern = %req.route.path_pattern,
            handler = %req.handler_name(),
            "Request entering handler"
        );
        None
    }

    fn after(&self, req: &BoundRequest, res: &mut HandlerResponse, latency: Duration) {
        let span = info_span!(
            "request",
            request_id = %req.request_id,
            method = %req.route.method,
            route_pattern = %req.route.path_pattern,
            handler = %req.handler_name(),
        );
        let _guard = span.enter();
        info!(
            status = res.status,
            latency_ms = latency.as_millis() as u64,
            "Request handled"
        );
    }
}
