//! The tutorial API: a route manifest plus handlers for every route in it.
//!
//! The manifest lives in `demos/tutorial.yaml` and is compiled into the
//! binary. It walks through path, query, body and cookie parameters,
//! numeric and string constraints, nested models, embedded bodies, dict
//! bodies and the extra scalar types.

use crate::binding::temporal::{format_datetime, format_duration, parse_datetime, parse_duration};
use crate::binding::BoundRequest;
use crate::dispatcher::{Dispatcher, HandlerResponse};
use crate::echo::echo_handler;
use crate::middleware::{RequestIdMiddleware, TracingMiddleware};
use crate::router::Router;
use crate::server::AppService;
use crate::spec::{build_routes, parse_manifest, Manifest, RouteTable};
use crate::typed::{Handler, TypedHandlerRequest};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

pub const TUTORIAL_MANIFEST: &str = include_str!("../demos/tutorial.yaml");

const LONG_DESCRIPTION: &str = "This is an amazing item that has a long description";

/// # Errors
///
/// Only if the embedded manifest is malformed.
pub fn tutorial_manifest() -> anyhow::Result<Manifest> {
    parse_manifest(TUTORIAL_MANIFEST, true).context("embedded tutorial manifest")
}

/// # Errors
///
/// Only if the embedded manifest is malformed.
pub fn tutorial_routes() -> anyhow::Result<RouteTable> {
    let manifest = tutorial_manifest()?;
    build_routes(&manifest).context("embedded tutorial manifest")
}

/// The tutorial service with every handler registered.
///
/// # Errors
///
/// Only if the embedded manifest is malformed.
pub fn build_service() -> anyhow::Result<AppService> {
    let router = Router::new(tutorial_routes()?);
    let mut dispatcher = Dispatcher::new();
    register_handlers(&mut dispatcher);
    Ok(service_with_fallback(router, dispatcher))
}

/// A service for an arbitrary route table where every handler echoes its
/// bound values.
#[must_use]
pub fn echo_service(table: RouteTable) -> AppService {
    service_with_fallback(Router::new(table), Dispatcher::new())
}

fn service_with_fallback(router: Router, mut dispatcher: Dispatcher) -> AppService {
    let missing: Vec<String> = router
        .routes()
        .iter()
        .map(|r| r.handler_name.clone())
        .filter(|name| !dispatcher.has_handler(name))
        .collect();
    for name in missing {
        debug!(handler_name = %name, "Registering echo fallback");
        dispatcher.register_handler(&name, echo_handler);
    }
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    dispatcher.add_middleware(Arc::new(RequestIdMiddleware));
    AppService::new(router, dispatcher)
}

/// Collect the named bound values into one object (absent ones as `null`).
fn pick(req: &BoundRequest, names: &[&str]) -> Map<String, Value> {
    names
        .iter()
        .map(|name| {
            let value = req.values.get(*name).cloned().unwrap_or(Value::Null);
            ((*name).to_string(), value)
        })
        .collect()
}

/// Non-empty strings count as given.
fn given<'a>(req: &'a BoundRequest, name: &str) -> Option<&'a str> {
    req.get_str(name).filter(|s| !s.is_empty())
}

fn ok(map: Map<String, Value>) -> HandlerResponse {
    HandlerResponse::ok(Value::Object(map))
}

pub fn register_handlers(dispatcher: &mut Dispatcher) {
    dispatcher.register_handler("root", |_| HandlerResponse::ok(json!({"message": "Hello World"})));
    dispatcher.register_handler("read_item", |req| ok(pick(req, &["item_id"])));
    dispatcher.register_handler("read_user_me", |_| {
        HandlerResponse::ok(json!({"user_id": "the current user"}))
    });
    dispatcher.register_handler("read_user", |req| ok(pick(req, &["user_id"])));
    dispatcher.register_handler("get_model", get_model);
    dispatcher.register_handler("read_files", |req| ok(pick(req, &["file_path"])));
    dispatcher.register_handler("read_user_items", read_user_items);
    dispatcher.register_typed("create_book", CreateBookHandler);
    dispatcher.register_handler("read_query_items", read_query_items);
    dispatcher.register_handler("read_list_items", |req| ok(pick(req, &["q"])));
    dispatcher.register_handler("read_metadata_items", |req| {
        let mut results = Map::new();
        if let Some(q) = given(req, "q") {
            results.insert("q".into(), json!(q));
        }
        ok(results)
    });
    dispatcher.register_handler("read_path_items", |req| {
        let mut results = pick(req, &["item_id", "q"]);
        if req.get_bool("desc") == Some(true) {
            results.insert("description".into(), json!(LONG_DESCRIPTION));
        }
        ok(results)
    });
    dispatcher.register_typed("read_numeric_items", ReadNumericItemsHandler);
    dispatcher.register_handler("update_lib_item", |req| {
        let mut results = pick(req, &["item_id", "item", "user", "importance"]);
        if let Some(q) = given(req, "q") {
            results.insert("q".into(), json!(q));
        }
        ok(results)
    });
    for name in [
        "read_embed_body_item",
        "update_field_item",
        "create_example_item",
        "update_example_field_item",
        "create_example_items_multiple",
    ] {
        dispatcher.register_handler(name, |req| ok(pick(req, &["item_id", "item"])));
    }
    dispatcher.register_handler("create_nested_user", |req| {
        let mut results = pick(req, &["user_id", "user"]);
        if let Some(q) = given(req, "q") {
            results.insert("q".into(), json!(q));
        }
        ok(results)
    });
    dispatcher.register_handler("create_index_heights", |req| {
        HandlerResponse::ok(req.values.get("weights").cloned().unwrap_or(Value::Null))
    });
    dispatcher.register_handler("create_extra_item", create_extra_item);
    dispatcher.register_handler("read_cookie_items", |req| ok(pick(req, &["maryland_cookie"])));
}

fn get_model(req: &BoundRequest) -> HandlerResponse {
    let model_name = req.get_str("model_name").unwrap_or_default();
    let msg = match model_name {
        "alexnet" => "Deep Learning FTW!",
        "lenet" => "LeCNN all the images",
        _ => "Have some residuals",
    };
    HandlerResponse::ok(json!({ "model_name": model_name, "msg": msg }))
}

fn read_user_items(req: &BoundRequest) -> HandlerResponse {
    let mut item = Map::new();
    item.insert("item_id".into(), req.values.get("item_id").cloned().unwrap_or_default());
    item.insert("owner_id".into(), req.values.get("user_id").cloned().unwrap_or_default());
    item.insert("needy".into(), req.values.get("needy").cloned().unwrap_or_default());
    if let Some(q) = given(req, "q") {
        item.insert("q".into(), json!(q));
    }
    if req.get_bool("short") != Some(true) {
        item.insert("description".into(), json!(LONG_DESCRIPTION));
    }
    ok(item)
}

/// `q` may be explicitly null; the value doubles as the response key.
fn read_query_items(req: &BoundRequest) -> HandlerResponse {
    let q = req.get("q").cloned().unwrap_or(Value::Null);
    let key = match &q {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut results = Map::new();
    results.insert(key, q);
    ok(results)
}

fn create_extra_item(req: &BoundRequest) -> HandlerResponse {
    let parsed = (|| {
        let start = parse_datetime(req.get_str("start_datetime")?)?;
        let end = parse_datetime(req.get_str("end_datetime")?)?;
        let process_after = parse_duration(req.get_str("process_after")?)?;
        let process_start = start.checked_add_signed(process_after)?;
        Some((process_start, end.signed_duration_since(process_start)))
    })();
    let Some((process_start, duration)) = parsed else {
        return HandlerResponse::error(500, "bound datetime values could not be re-read");
    };
    let mut results = pick(req, &["item_id", "repeat_at"]);
    results.insert("process_start".into(), json!(format_datetime(&process_start)));
    results.insert("duration".into(), json!(format_duration(&duration)));
    ok(results)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub year: i64,
    pub price: f64,
    pub isbn: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateBook {
    pub book: Book,
    pub quantity: i64,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedBook {
    #[serde(flatten)]
    pub book: Book,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: i64,
}

struct CreateBookHandler;

impl Handler for CreateBookHandler {
    type Request = CreateBook;
    type Response = CreatedBook;

    fn handle(&self, req: TypedHandlerRequest<CreateBook>) -> CreatedBook {
        let CreateBook {
            book,
            quantity,
            category,
        } = req.data;
        CreatedBook {
            book,
            category,
            quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NumericItem {
    pub item_id: i64,
    pub q: String,
    pub size: f64,
}

struct ReadNumericItemsHandler;

impl Handler for ReadNumericItemsHandler {
    type Request = NumericItem;
    type Response = NumericItem;

    fn handle(&self, req: TypedHandlerRequest<NumericItem>) -> NumericItem {
        req.data
    }
}
