use super::error::RequestError;
use super::request::ParsedRequest;
use crate::binding::{bind, BoundRequest};
use crate::dispatcher::{Dispatcher, HandlerResponse};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::Router;
use crate::runtime_config::RuntimeConfig;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Lifecycle of one request between arrival and handler invocation.
///
/// ```text
/// Unmatched -> Matched -> Classifying -> Validating -> Bound
///     |                                      |
///     +------------------> Rejected <--------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Unmatched,
    Matched,
    Classifying,
    Validating,
    Bound,
    Rejected,
}

impl RequestState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Unmatched => "unmatched",
            RequestState::Matched => "matched",
            RequestState::Classifying => "classifying",
            RequestState::Validating => "validating",
            RequestState::Bound => "bound",
            RequestState::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes, binds and dispatches requests.
///
/// Cheap to clone; the router and dispatcher are shared read-only, so one
/// service can be used from any number of threads at once.
#[derive(Debug, Clone)]
pub struct AppService {
    router: Arc<Router>,
    dispatcher: Arc<Dispatcher>,
    config: RuntimeConfig,
}

impl AppService {
    /// Create a service with configuration read from the environment.
    #[must_use]
    pub fn new(router: Router, dispatcher: Dispatcher) -> Self {
        Self {
            router: Arc::new(router),
            dispatcher: Arc::new(dispatcher),
            config: RuntimeConfig::from_env(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Match and bind a request without invoking its handler.
    ///
    /// # Errors
    ///
    /// [`RequestError::PayloadTooLarge`], [`RequestError::NotFound`] or
    /// [`RequestError::Validation`].
    pub fn resolve(&self, request: &ParsedRequest) -> Result<BoundRequest, RequestError> {
        let request_id = RequestId::from_header_or_new(request.header(REQUEST_ID_HEADER));
        let mut state = RequestState::Unmatched;

        let body_len = request.body_len();
        if body_len > self.config.max_body_bytes {
            warn!(
                request_id = %request_id,
                body_size_bytes = body_len,
                limit = self.config.max_body_bytes,
                "Request body too large"
            );
            transition(request_id, &mut state, RequestState::Rejected);
            return Err(RequestError::PayloadTooLarge {
                size: body_len,
                limit: self.config.max_body_bytes,
            });
        }

        let Some(route_match) = self.router.route(request.method.clone(), &request.path) else {
            transition(request_id, &mut state, RequestState::Rejected);
            return Err(RequestError::NotFound {
                method: request.method.to_string(),
                path: request.path.clone(),
            });
        };
        transition(request_id, &mut state, RequestState::Matched);
        transition(request_id, &mut state, RequestState::Classifying);
        transition(request_id, &mut state, RequestState::Validating);

        match bind(self.router.types(), &route_match, request, request_id) {
            Ok(bound) => {
                transition(request_id, &mut state, RequestState::Bound);
                Ok(bound)
            }
            Err(err) => {
                transition(request_id, &mut state, RequestState::Rejected);
                Err(err.into())
            }
        }
    }

    /// Produce the response for one request.
    #[must_use]
    pub fn handle(&self, request: &ParsedRequest) -> HandlerResponse {
        let start = Instant::now();
        let response = match self.resolve(request) {
            Ok(bound) => self.dispatcher.dispatch(&bound).unwrap_or_else(|| {
                RequestError::HandlerNotFound(bound.handler_name().to_string()).into_response()
            }),
            Err(err) => err.into_response(),
        };
        info!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            latency_us = start.elapsed().as_micros() as u64,
            "Request completed"
        );
        response
    }
}

fn transition(request_id: RequestId, state: &mut RequestState, next: RequestState) {
    debug!(
        request_id = %request_id,
        from = %state,
        to = %next,
        "Request state transition"
    );
    *state = next;
}
