use std::time::Duration;

use super::Middleware;
use crate::binding::BoundRequest;
use crate::dispatcher::HandlerResponse;
use crate::ids::REQUEST_ID_HEADER;

/// Echoes the request id on every response so clients can correlate logs.
pub struct RequestIdMiddleware;

impl Middleware for RequestIdMiddleware {
    fn after(&self, req: &BoundRequest, res: &mut HandlerResponse, _latency: Duration) {
        res.set_header(REQUEST_ID_HEADER, req.request_id.to_string());
    }
}
