//! # Router Module
//!
//! The router matches an incoming method and path against the registered
//! route templates and extracts the raw placeholder values.
//!
//! ## Overview
//!
//! - Templates are parsed once at registration into literal segments,
//!   single-segment placeholders (`{id}`) and rest-of-path placeholders
//!   (`{file_path:path}` or `{file_path*}`).
//! - Matching scans templates in registration order; the **first** structural
//!   match with the same method wins. This is first-match, not best-match:
//!
//! ```text
//! GET /users/{user_id}   -> read_user      (registered first)
//! GET /users/me          -> read_user_me   (never reached)
//!
//! GET /users/me  ==>  read_user { user_id = "me" }
//! ```
//!
//! - No match yields `None`, with no partial captures.
//!
//! ## Example
//!
//! ```rust
//! use bindrouter::router::Router;
//! use bindrouter::spec::{build_routes, Manifest, RouteDecl};
//! use http::Method;
//!
//! let manifest = Manifest::new("demo")
//!     .route(RouteDecl::get("/users/{user_id}", "read_user"))
//!     .route(RouteDecl::get("/users/me", "read_user_me"));
//! let router = Router::new(build_routes(&manifest).unwrap());
//!
//! let m = router.route(Method::GET, "/users/me").unwrap();
//! assert_eq!(m.handler_name, "read_user");
//! assert_eq!(m.get_path_param("user_id"), Some("me"));
//! ```

mod core;
mod template;
#[cfg(test)]
mod tests;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use template::{PathTemplate, Segment, TemplateError};
