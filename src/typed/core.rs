use crate::binding::BoundRequest;
use crate::dispatcher::{Dispatcher, HandlerResponse};
use crate::ids::RequestId;
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::TryFrom;
use std::sync::Arc;
use tracing::error;

/// Trait implemented by typed handlers.
///
/// The bound values of a request are deserialized into `Request`; the returned
/// `Response` is serialized as the 200 body.
pub trait Handler: Send + Sync + 'static {
    /// Struct whose fields are the route's parameter names
    type Request: DeserializeOwned;
    /// Serialized to JSON as the response body
    type Response: Serialize;

    fn handle(&self, req: TypedHandlerRequest<Self::Request>) -> Self::Response;
}

/// Typed request data passed to a [`Handler`].
#[derive(Debug, Clone)]
pub struct TypedHandlerRequest<T> {
    pub request_id: RequestId,
    pub method: Method,
    /// Template of the matched route, e.g. `/items/{item_id}`
    pub route_pattern: String,
    pub handler_name: String,
    pub data: T,
}

impl<T: DeserializeOwned> TryFrom<&BoundRequest> for TypedHandlerRequest<T> {
    type Error = serde_json::Error;

    fn try_from(req: &BoundRequest) -> Result<Self, Self::Error> {
        Ok(TypedHandlerRequest {
            request_id: req.request_id,
            method: req.route.method.clone(),
            route_pattern: req.route.path_pattern.clone(),
            handler_name: req.handler_name().to_string(),
            data: req.extract()?,
        })
    }
}

impl Dispatcher {
    /// Register a typed handler.
    ///
    /// A request struct that disagrees with the declared parameters is a
    /// server-side configuration fault: the request already passed
    /// validation, so the mismatch is answered with 500, not 4xx.
    pub fn register_typed<H: Handler>(&mut self, name: &str, handler: H) {
        let handler = Arc::new(handler);
        self.register_handler(name, move |req: &BoundRequest| {
            let typed = match TypedHandlerRequest::<H::Request>::try_from(req) {
                Ok(typed) => typed,
                Err(err) => {
                    error!(
                        request_id = %req.request_id,
                        handler_name = %req.handler_name(),
                        error = %err,
                        "Typed request extraction failed"
                    );
                    return HandlerResponse::error(500, &format!("Invalid request data: {err}"));
                }
            };
            match serde_json::to_value(handler.handle(typed)) {
                Ok(body) => HandlerResponse::ok(body),
                Err(err) => {
                    error!(
                        request_id = %req.request_id,
                        handler_name = %req.handler_name(),
                        error = %err,
                        "Failed to serialize response"
                    );
                    HandlerResponse::error(500, "Failed to serialize response")
                }
            }
        });
    }
}
