use crate::binding::BoundRequest;
use crate::dispatcher::HandlerResponse;
use serde_json::json;

/// Fallback handler: answers with the bound values of the request.
#[must_use]
pub fn echo_handler(req: &BoundRequest) -> HandlerResponse {
    HandlerResponse::ok(json!({
        "handler": req.handler_name(),
        "method": req.route.method.to_string(),
        "route": req.route.path_pattern,
        "values": req.values,
    }))
}
