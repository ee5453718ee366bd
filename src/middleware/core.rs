use std::time::Duration;

use crate::binding::BoundRequest;
use crate::dispatcher::HandlerResponse;

/// Hooks around handler invocation.
///
/// `before` may answer the request itself by returning a response; the handler
/// is then skipped but every `after` hook still runs.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &BoundRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &BoundRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
