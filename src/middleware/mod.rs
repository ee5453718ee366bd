mod core;
mod request_id;
mod tracing;

pub use core::Middleware;
pub use request_id::RequestIdMiddleware;
pub use tracing::TracingMiddleware;
