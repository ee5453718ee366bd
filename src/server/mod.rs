//! # Server Module
//!
//! Transport-independent request handling: [`ParsedRequest`] is built from
//! raw HTTP parts, and [`AppService`] routes, binds and dispatches it,
//! answering with a [`HandlerResponse`](crate::dispatcher::HandlerResponse).
//!
//! | Outcome                         | Status | Body                              |
//! |---------------------------------|--------|-----------------------------------|
//! | handler ran                     | 200    | handler output                    |
//! | no route matches                | 404    | `{"detail": "Not Found"}`         |
//! | validation failed               | 422    | `{"detail": [issue, ...]}`        |
//! | body over `BINDR_MAX_BODY_BYTES`| 413    | `{"detail": "Request body too large", ...}` |
//! | route has no handler            | 404    | `{"error": "Handler not found"}`  |
//! | handler panicked                | 500    | `{"error": "Handler panicked: ..."}` |

mod error;
mod request;
mod service;

pub use error::RequestError;
pub use request::{parse_cookies, parse_query_params, ParsedRequest};
pub use service::{AppService, RequestState};
