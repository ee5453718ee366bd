//! Tests for the handler registry and request lifecycle
//!
//! # Test Coverage
//!
//! - Handler registration, lookup and replacement
//! - Typed handlers and typed extraction failures
//! - Middleware ordering and early responses
//! - Panic isolation (500) and unregistered handlers (404)
//! - Body size limit (413)
//! - One service shared across threads

use bindrouter::binding::BoundRequest;
use bindrouter::dispatcher::{Dispatcher, HandlerResponse};
use bindrouter::middleware::{Middleware, RequestIdMiddleware, TracingMiddleware};
use bindrouter::router::Router;
use bindrouter::runtime_config::RuntimeConfig;
use bindrouter::server::{AppService, ParsedRequest, RequestError};
use bindrouter::spec::{build_routes, parse_manifest};
use bindrouter::typed::{Handler, TypedHandlerRequest};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const MANIFEST: &str = r#"
title: Pets
routes:
  - method: GET
    path: /pets/{id}
    handler: get_pet
    parameters:
      - { name: id, type: int }
      - { name: verbose, type: bool, default: false }
  - method: POST
    path: /pets
    handler: add_pet
    parameters:
      - { name: name, type: str, in: body }
      - { name: age, type: int, in: body }
  - { method: GET, path: /boom, handler: boom }
  - { method: GET, path: /orphan, handler: nobody_home }
"#;

fn router() -> Router {
    Router::new(build_routes(&parse_manifest(MANIFEST, true).unwrap()).unwrap())
}

#[derive(Debug, Deserialize)]
struct NewPet {
    name: String,
    age: i64,
}

#[derive(Debug, Serialize)]
struct PetCreated {
    name: String,
    age: i64,
    adult: bool,
}

struct AddPet;

impl Handler for AddPet {
    type Request = NewPet;
    type Response = PetCreated;

    fn handle(&self, req: TypedHandlerRequest<NewPet>) -> PetCreated {
        assert_eq!(req.route_pattern, "/pets");
        PetCreated {
            adult: req.data.age >= 2,
            name: req.data.name,
            age: req.data.age,
        }
    }
}

fn dispatcher() -> Dispatcher {
    let mut d = Dispatcher::new();
    d.register_handler("get_pet", |req: &BoundRequest| {
        HandlerResponse::ok(json!({ "id": req.get_i64("id"), "verbose": req.get_bool("verbose") }))
    });
    d.register_typed("add_pet", AddPet);
    d.register_handler("boom", |_| panic!("kaboom"));
    d
}

fn service() -> AppService {
    AppService::new(router(), dispatcher()).with_config(RuntimeConfig::default())
}

#[test]
fn test_dispatcher_routes_to_handler() {
    let resp = service().handle(&ParsedRequest::new(Method::GET, "/pets/4?verbose=yes"));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({"id": 4, "verbose": true}));
    assert_eq!(resp.get_header("content-type"), Some("application/json"));
}

#[test]
fn test_typed_handler() {
    let req = ParsedRequest::new(Method::POST, "/pets").with_json(&json!({"name": "Rex", "age": "3"}));
    let resp = service().handle(&req);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({"name": "Rex", "age": 3, "adult": true}));
}

#[test]
fn test_typed_extraction_mismatch_is_500() {
    struct WantsString;
    #[derive(Deserialize)]
    struct Req {
        #[allow(dead_code)]
        id: String,
    }
    impl Handler for WantsString {
        type Request = Req;
        type Response = ();
        fn handle(&self, _req: TypedHandlerRequest<Req>) {}
    }

    let mut d = dispatcher();
    d.register_typed("get_pet", WantsString);
    let svc = AppService::new(router(), d).with_config(RuntimeConfig::default());
    let resp = svc.handle(&ParsedRequest::new(Method::GET, "/pets/1"));
    assert_eq!(resp.status, 500);
    assert!(resp.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request data"));
}

#[test]
fn test_panic_handler_returns_500() {
    let svc = service();
    let resp = svc.handle(&ParsedRequest::new(Method::GET, "/boom"));
    assert_eq!(resp.status, 500);
    assert!(resp.body["error"].as_str().unwrap().contains("kaboom"));

    // the table is intact afterwards
    let resp = svc.handle(&ParsedRequest::new(Method::GET, "/pets/1"));
    assert_eq!(resp.status, 200);
}

#[test]
fn test_unregistered_handler_is_404() {
    let resp = service().handle(&ParsedRequest::new(Method::GET, "/orphan"));
    assert_eq!(resp.status, 404);
    assert_eq!(resp.body, json!({"error": "Handler not found"}));
}

#[test]
fn test_body_limit_checked_before_routing() {
    let svc = AppService::new(router(), dispatcher())
        .with_config(RuntimeConfig::default().with_max_body_bytes(8));
    let req = ParsedRequest::new(Method::POST, "/nowhere").with_body(vec![b'x'; 9]);
    assert_eq!(svc.handle(&req).status, 413);
    assert!(matches!(
        svc.resolve(&req),
        Err(RequestError::PayloadTooLarge { size: 9, limit: 8 })
    ));

    let req = ParsedRequest::new(Method::POST, "/pets").with_body(r#"{"name":"a"}"#);
    assert_eq!(svc.handle(&req).status, 413);
}

#[test]
fn test_replacing_a_handler() {
    let mut d = dispatcher();
    d.register_handler("get_pet", |_| HandlerResponse::ok(json!("replaced")));
    assert_eq!(d.handler_names(), vec!["add_pet", "boom", "get_pet"]);
    let svc = AppService::new(router(), d).with_config(RuntimeConfig::default());
    assert_eq!(
        svc.handle(&ParsedRequest::new(Method::GET, "/pets/1")).body,
        json!("replaced")
    );
}

struct Counting {
    before: Arc<AtomicUsize>,
    after: Arc<AtomicUsize>,
}

impl Middleware for Counting {
    fn before(&self, _req: &BoundRequest) -> Option<HandlerResponse> {
        self.before.fetch_add(1, Ordering::SeqCst);
        None
    }

    fn after(&self, _req: &BoundRequest, res: &mut HandlerResponse, _latency: Duration) {
        self.after.fetch_add(1, Ordering::SeqCst);
        res.set_header("x-counted", "yes".to_string());
    }
}

struct Gate;

impl Middleware for Gate {
    fn before(&self, req: &BoundRequest) -> Option<HandlerResponse> {
        (req.get_i64("id") == Some(13)).then(|| HandlerResponse::error(403, "unlucky"))
    }
}

#[test]
fn test_middleware_hooks_and_early_response() {
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let mut d = dispatcher();
    d.add_middleware(Arc::new(TracingMiddleware));
    d.add_middleware(Arc::new(RequestIdMiddleware));
    d.add_middleware(Arc::new(Gate));
    d.add_middleware(Arc::new(Counting {
        before: Arc::clone(&before),
        after: Arc::clone(&after),
    }));
    let svc = AppService::new(router(), d).with_config(RuntimeConfig::default());

    let resp = svc.handle(
        &ParsedRequest::new(Method::GET, "/pets/1")
            .with_header("X-Request-Id", "01ARZ3NDEKTSV4RRFFQ69G5FAV"),
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.get_header("x-counted"), Some("yes"));
    assert_eq!(resp.get_header("x-request-id"), Some("01ARZ3NDEKTSV4RRFFQ69G5FAV"));

    let resp = svc.handle(&ParsedRequest::new(Method::GET, "/pets/13"));
    assert_eq!(resp.status, 403);

    // every middleware sees every dispatched request, early or not
    assert_eq!(before.load(Ordering::SeqCst), 2);
    assert_eq!(after.load(Ordering::SeqCst), 2);
}

#[test]
fn test_service_shared_across_threads() {
    let svc = service();
    let handles: Vec<_> = (1..=16)
        .map(|i| {
            let svc = svc.clone();
            thread::spawn(move || {
                let resp = svc.handle(&ParsedRequest::new(Method::GET, &format!("/pets/{i}")));
                assert_eq!(resp.status, 200);
                assert_eq!(resp.body["id"], i);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
