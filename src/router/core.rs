//! Router core module - request path matching.
//!
//! Matching is a linear, first-match scan over the templates in registration
//! order. A more specific template registered later never wins over an
//! earlier one that already fits.

use crate::spec::{RouteMeta, RouteTable, TypeRegistry};
use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum number of captured path parameters before heap allocation.
/// Most routes have ≤4 placeholders (e.g., /users/{user_id}/items/{item_id}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured placeholder values, in template order.
///
/// Names are `Arc<str>` shared with the compiled template; values are
/// per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route declaration
    pub route: Arc<RouteMeta>,
    /// Raw captured placeholder values (e.g., `{user_id}` → `("user_id", "42")`)
    pub path_params: ParamVec,
    /// Name of the handler that should process this request
    pub handler_name: String,
}

impl RouteMatch {
    /// Get a captured path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Immutable route table plus matcher.
///
/// Cheap to clone and safe to share across threads; nothing in it changes
/// after construction.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Arc<RouteMeta>>,
    types: Arc<TypeRegistry>,
    title: String,
}

impl Router {
    /// Create a router from a built [`RouteTable`].
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        let RouteTable {
            title,
            routes,
            types,
        } = table;
        let routes: Vec<Arc<RouteMeta>> = routes.into_iter().map(Arc::new).collect();

        let routes_summary: Vec<String> = routes
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.method, r.path_pattern))
            .collect();
        info!(
            title = %title,
            routes_count = routes.len(),
            routes_summary = ?routes_summary,
            routing_algorithm = "first_match_linear",
            "Routing table loaded"
        );

        Self {
            routes,
            types: Arc::new(types),
            title,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Routes in registration (and therefore matching) order.
    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteMeta>] {
        &self.routes
    }

    /// Enum and model definitions referenced by the routes.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Print all registered routes to stdout, in matching order.
    pub fn dump_routes(&self) {
        println!("[routes] title={} count={}", self.title, self.routes.len());
        for meta in &self.routes {
            println!(
                "[route] {} {} -> {}",
                meta.method, meta.path_pattern, meta.handler_name
            );
        }
    }

    /// Match an HTTP request to a route
    ///
    /// Scans templates in registration order and returns the first whose method
    /// and structure both fit.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `path` - Request path without the query string (e.g., `/users/123`)
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - The first matching route and its raw captures
    /// * `None` - If no route matches (results in 404)
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let found = self.routes.iter().find_map(|route| {
            if route.method != method {
                return None;
            }
            route
                .template
                .matches(path)
                .map(|params| (Arc::clone(route), params))
        });

        let match_duration = match_start.elapsed();

        if let Some((route, params)) = found {
            if match_duration > Duration::from_millis(1) {
                warn!(
                    method = %method,
                    path = %path,
                    handler_name = %route.handler_name,
                    route_pattern = %route.path_pattern,
                    duration_us = match_duration.as_micros(),
                    "Slow route matching detected"
                );
            } else {
                info!(
                    method = %method,
                    path = %path,
                    handler_name = %route.handler_name,
                    route_pattern = %route.path_pattern,
                    path_params = ?params,
                    duration_us = match_duration.as_micros(),
                    "Route matched"
                );
            }

            let handler_name = route.handler_name.clone();
            return Some(RouteMatch {
                route,
                path_params: params,
                handler_name,
            });
        }

        warn!(
            method = %method,
            path = %path,
            duration_us = match_duration.as_micros(),
            "No route matched"
        );
        None
    }

    /// All registered path patterns, in order.
    #[must_use]
    pub fn get_all_path_patterns(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.path_pattern.clone()).collect()
    }
}
