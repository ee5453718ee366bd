//! # Typed Module
//!
//! Type-safe handlers: the bound parameter values of a request are
//! deserialized into a struct whose fields are the parameter names, and the
//! handler's return value is serialized as the JSON response.
//!
//! ## Usage
//!
//! ```rust
//! use bindrouter::dispatcher::Dispatcher;
//! use bindrouter::typed::{Handler, TypedHandlerRequest};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct ReadItem {
//!     item_id: i64,
//!     q: Option<String>,
//! }
//!
//! #[derive(Serialize)]
//! struct ItemOut {
//!     item_id: i64,
//!     q: Option<String>,
//! }
//!
//! struct ReadItemHandler;
//!
//! impl Handler for ReadItemHandler {
//!     type Request = ReadItem;
//!     type Response = ItemOut;
//!
//!     fn handle(&self, req: TypedHandlerRequest<ReadItem>) -> ItemOut {
//!         ItemOut { item_id: req.data.item_id, q: req.data.q }
//!     }
//! }
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register_typed("read_item", ReadItemHandler);
//! ```
//!
//! Validation has already happened when a typed handler runs, so a failed
//! conversion means the struct and the declarations disagree; it is answered
//! with 500.

mod core;

pub use core::*;
