//! # bindrouter
//!
//! **bindrouter** is a declaration-driven request router for Rust. Routes and
//! their parameters are declared as data; every incoming request is matched,
//! its parameters are classified, coerced and validated, and the handler
//! receives typed values or the client receives a structured list of every
//! problem found.
//!
//! ## Overview
//!
//! The library is organized into several key modules:
//!
//! - **[`spec`]** - Route manifests (YAML/JSON or builders) and registration into a [`spec::RouteTable`]
//! - **[`router`]** - Path templates and first-match route resolution
//! - **[`binding`]** - Parameter classification, lax coercion and constraint checks
//! - **[`validator`]** - Validation issues and the aggregated error payload
//! - **[`dispatcher`]** - Handler registry and panic-isolated dispatch
//! - **[`typed`]** - Type-safe handlers over `serde` request/response structs
//! - **[`middleware`]** - Before/after hooks (tracing, request ids)
//! - **[`server`]** - Transport-independent request parsing and the request lifecycle
//! - **[`tutorial`]** - The built-in demo API
//! - **[`cli`]** - The `bindrouter` command line
//!
//! ### Registration Flow
//!
//! Every configuration fault surfaces once, before the first request:
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant Load as spec::load_routes
//!     participant Build as spec::build_routes
//!     participant Classify as binding::classify_parameter
//!     participant Router as Router::new
//!
//!     User->>Load: load_routes("routes.yaml")
//!     Load->>Load: Parse YAML/JSON into Manifest
//!     Load->>Build: build_routes(&manifest)
//!     Build->>Build: Parse templates, resolve types,<br/>compile patterns, coerce defaults
//!     Build->>Classify: each parameter
//!     Classify-->>Build: path / query / body / cookie
//!     Build->>Build: Compute body layout
//!     alt Invalid declaration
//!         Build-->>User: RegistrationError
//!     end
//!     Build-->>User: RouteTable
//!     User->>Router: Router::new(table)
//! ```
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as AppService
//!     participant Router as Router
//!     participant Bind as binding::bind
//!     participant Dispatcher as Dispatcher
//!     participant Handler as Handler
//!
//!     Client->>Service: ParsedRequest
//!     alt Body over limit
//!         Service-->>Client: 413
//!     end
//!     Service->>Router: route(method, path)
//!     alt No route matches
//!         Router-->>Client: 404 {"detail": "Not Found"}
//!     end
//!     Router-->>Service: RouteMatch (raw captures)
//!     Service->>Bind: bind(route_match, request)
//!     Bind->>Bind: Read path, query, cookie, body
//!     Bind->>Bind: Coerce and check constraints,<br/>collecting every issue
//!     alt Any issue
//!         Bind-->>Client: 422 {"detail": [issues]}
//!     end
//!     Bind-->>Service: BoundRequest
//!     Service->>Dispatcher: dispatch(&bound)
//!     alt Handler not registered
//!         Dispatcher-->>Client: 404 {"error": "Handler not found"}
//!     end
//!     Dispatcher->>Handler: middleware before, handler, middleware after
//!     alt Handler panics
//!         Handler-->>Client: 500
//!     end
//!     Handler-->>Client: 200 + JSON body
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use bindrouter::dispatcher::{Dispatcher, HandlerResponse};
//! use bindrouter::router::Router;
//! use bindrouter::server::{AppService, ParsedRequest};
//! use bindrouter::spec::{build_routes, parse_manifest};
//! use http::Method;
//! use serde_json::json;
//!
//! let manifest = parse_manifest(
//!     r#"
//! title: Items
//! routes:
//!   - method: GET
//!     path: /items/{item_id}
//!     handler: read_item
//!     parameters:
//!       - { name: item_id, type: int, ge: 1 }
//!       - { name: q, type: "optional[str]" }
//! "#,
//!     true,
//! )
//! .unwrap();
//! let router = Router::new(build_routes(&manifest).unwrap());
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register_handler("read_item", |req| {
//!     HandlerResponse::ok(json!({ "item_id": req.get_i64("item_id"), "q": req.get("q") }))
//! });
//! let service = AppService::new(router, dispatcher);
//!
//! let ok = service.handle(&ParsedRequest::new(Method::GET, "/items/5?q=x"));
//! assert_eq!(ok.status, 200);
//! assert_eq!(ok.body, json!({ "item_id": 5, "q": "x" }));
//!
//! let bad = service.handle(&ParsedRequest::new(Method::GET, "/items/0"));
//! assert_eq!(bad.status, 422);
//! assert_eq!(bad.body["detail"][0]["type"], "greater_than_equal");
//! ```
//!
//! ## Runtime Considerations
//!
//! - Routing is a linear scan in registration order and the first structural
//!   match wins. Register literal routes before placeholder routes that would
//!   shadow them.
//! - The router, type registry and dispatcher are immutable after
//!   construction and shared by `Arc`; one [`server::AppService`] serves any
//!   number of threads.
//! - Logging goes through `tracing`; [`logging::init_logging_with_config`]
//!   installs a JSON or pretty subscriber writing to stderr.
//! - `BINDR_MAX_BODY_BYTES` caps the request body (default 1 MiB).

pub mod binding;
pub mod cli;
pub mod dispatcher;
pub mod echo;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod spec;
pub mod tutorial;
pub mod typed;
pub mod validator;

pub use binding::BoundRequest;
pub use spec::{
    build_routes, load_routes, ParameterLocation, ParameterMeta, RouteMeta, RouteTable,
};
pub use validator::{ValidationError, ValidationIssue};
