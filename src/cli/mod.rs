//! # CLI Module
//!
//! Command-line access to the route table and the binding pipeline.
//!
//! ## Commands
//!
//! ### `inspect`
//!
//! Print routes in matching order, with each parameter's type, origin and
//! presence rule:
//!
//! ```bash
//! bindrouter inspect
//! bindrouter inspect --routes routes.yaml
//! ```
//!
//! ### `request`
//!
//! Run one request and print the status, response headers and JSON body.
//! Without `--routes` the built-in tutorial handlers answer; with a manifest,
//! every route echoes its bound values.
//!
//! ```bash
//! bindrouter request GET '/items/5?q=x'
//! bindrouter request POST /books/fiction --body '{"title":"Dune", ...}'
//! bindrouter request GET /cookie-items/ --cookie maryland_cookie=oatmeal
//! ```
//!
//! `BINDR_ROUTES` stands in for `--routes`; `BINDR_MAX_BODY_BYTES` caps the
//! accepted body size.

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
