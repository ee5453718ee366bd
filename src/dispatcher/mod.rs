//! # Dispatcher Module
//!
//! Maps handler names to handler functions and invokes them with requests
//! that already passed binding.
//!
//! ## Overview
//!
//! - Handlers are registered by name at startup; routes refer to them through
//!   their `handler` field.
//! - A matched route whose handler was never registered is answered with 404
//!   `{"error": "Handler not found"}` by the service.
//! - Handler panics are caught with `catch_unwind` and answered with 500; the
//!   dispatcher is unaffected and keeps serving.
//! - Middleware `before` hooks may short-circuit with their own response;
//!   `after` hooks see every response together with the handler latency.
//!
//! ## Handler Registration
//!
//! ```rust
//! use bindrouter::dispatcher::{Dispatcher, HandlerResponse};
//! use serde_json::json;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register_handler("read_item", |req| {
//!     HandlerResponse::ok(json!({ "item_id": req.get("item_id") }))
//! });
//! assert!(dispatcher.has_handler("read_item"));
//! ```

mod core;

pub use core::{Dispatcher, HandlerFn, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS};
