//! Dispatcher core module - handler registry and invocation.
//!
//! Handlers are plain functions of a [`BoundRequest`]; they only ever see
//! values that already passed binding. A panicking handler is caught and
//! turned into a 500 response, and the registry stays usable afterwards.

use crate::binding::BoundRequest;
use crate::middleware::Middleware;
use serde::Serialize;
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Response header storage; names are shared `Arc<str>`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// A registered handler.
pub type HandlerFn = Arc<dyn Fn(&BoundRequest) -> HandlerResponse + Send + Sync>;

/// Status, headers and JSON body returned for a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 422, 500, etc.)
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response with a `content-type` header.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// 200 with the given body.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    /// `{"error": message}`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    /// `{"detail": detail}`
    #[must_use]
    pub fn detail(status: u16, detail: impl Into<Value>) -> Self {
        Self::json(status, json!({ "detail": detail.into() }))
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Maps handler names to handler functions and runs middleware around them.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, HandlerFn>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("Dispatcher")
            .field("handlers", &names)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `name`.
    pub fn register_handler<F>(&mut self, name: &str, handler_fn: F)
    where
        F: Fn(&BoundRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        if self.handlers.contains_key(name) {
            info!(handler_name = %name, "Replacing existing handler");
        }
        self.handlers.insert(name.to_string(), Arc::new(handler_fn));
        debug!(
            handler_name = %name,
            total_handlers = self.handlers.len(),
            "Handler registered"
        );
    }

    /// Middleware runs in the order it was added.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered handler names, sorted.
    #[must_use]
    pub fn handler_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the handler of a bound request.
    ///
    /// Returns `None` when no handler is registered under the route's handler
    /// name. A handler panic becomes a 500 response.
    #[must_use]
    pub fn dispatch(&self, req: &BoundRequest) -> Option<HandlerResponse> {
        let handler_name = req.handler_name();
        let Some(handler) = self.handlers.get(handler_name) else {
            error!(
                request_id = %req.request_id,
                handler_name = %handler_name,
                available_handlers = ?self.handler_names(),
                "Handler not found"
            );
            return None;
        };

        let mut early_resp: Option<HandlerResponse> = None;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            let resp = mw.before(req);
            if early_resp.is_none() && resp.is_some() {
                debug!(
                    request_id = %req.request_id,
                    middleware_idx = idx,
                    "Middleware returned early response"
                );
                early_resp = resp;
            }
        }

        let (mut resp, latency) = match early_resp {
            Some(r) => (r, Duration::ZERO),
            None => {
                info!(
                    request_id = %req.request_id,
                    handler_name = %handler_name,
                    "Handler execution start"
                );
                let start = Instant::now();
                let resp = match catch_unwind(AssertUnwindSafe(|| handler(req))) {
                    Ok(resp) => resp,
                    Err(panic) => {
                        let panic_message = panic_message(panic.as_ref());
                        error!(
                            request_id = %req.request_id,
                            handler_name = %handler_name,
                            panic_message = %panic_message,
                            "Handler panicked"
                        );
                        HandlerResponse::error(500, &format!("Handler panicked: {panic_message}"))
                    }
                };
                let elapsed = start.elapsed();
                info!(
                    request_id = %req.request_id,
                    handler_name = %handler_name,
                    status = resp.status,
                    execution_time_ms = elapsed.as_millis() as u64,
                    "Handler execution complete"
                );
                (resp, elapsed)
            }
        };

        for mw in &self.middlewares {
            mw.after(req, &mut resp, latency);
        }
        Some(resp)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
