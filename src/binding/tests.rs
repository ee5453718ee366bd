use super::{bind, parse_lax_bool, BoundRequest};
use crate::ids::RequestId;
use crate::router::Router;
use crate::server::ParsedRequest;
use crate::spec::{
    build_routes, BodyLayout, FieldDecl, Manifest, ModelDecl, ParamDecl, ParameterLocation,
    RegistrationError, RouteDecl,
};
use crate::validator::{IssueKind, LocSegment, ValidationError};
use http::Method;
use serde_json::{json, Value};

fn router(manifest: Manifest) -> Router {
    Router::new(build_routes(&manifest).unwrap())
}

fn run(router: &Router, request: ParsedRequest) -> Result<BoundRequest, ValidationError> {
    let m = router
        .route(request.method.clone(), &request.path)
        .expect("route should match");
    bind(router.types(), &m, &request, RequestId::new())
}

fn get(router: &Router, target: &str) -> Result<BoundRequest, ValidationError> {
    run(router, ParsedRequest::new(Method::GET, target))
}

fn locs(err: &ValidationError) -> Vec<Vec<LocSegment>> {
    err.issues.iter().map(|i| i.loc.clone()).collect()
}

fn items_manifest() -> Manifest {
    Manifest::new("t")
        .model(
            "Item",
            ModelDecl::new()
                .field(FieldDecl::new("name", "str"))
                .field(FieldDecl::new("description", "optional[str]"))
                .field(FieldDecl::new("price", "float").gt(0.0))
                .field(FieldDecl::new("tax", "optional[float]"))
                .field(FieldDecl::new("tags", "list[str]").default_value(json!([]))),
        )
        .model("User", ModelDecl::new().field(FieldDecl::new("username", "str")))
        .route(
            RouteDecl::get("/items/{item_id}", "read_item")
                .param(ParamDecl::new("item_id", "int"))
                .param(ParamDecl::new("q", "optional[str]"))
                .param(ParamDecl::new("short", "bool").with(|f| f.default_value(json!(false)))),
        )
        .route(
            RouteDecl::put("/items/{item_id}", "update_item")
                .param(ParamDecl::new("item_id", "int"))
                .param(ParamDecl::new("item", "Item")),
        )
        .route(
            RouteDecl::put("/multi/{item_id}", "update_multi")
                .param(ParamDecl::new("item_id", "int"))
                .param(ParamDecl::new("item", "Item"))
                .param(ParamDecl::new("user", "User"))
                .param(ParamDecl::body("importance", "int")),
        )
        .route(
            RouteDecl::put("/embed/{item_id}", "update_embed")
                .param(ParamDecl::new("item_id", "int"))
                .param(ParamDecl::new("item", "Item").embed()),
        )
        .route(
            RouteDecl::get("/needy/{item_id}", "read_needy")
                .param(ParamDecl::new("item_id", "str"))
                .param(ParamDecl::new("needy", "str"))
                .param(ParamDecl::new("skip", "int").with(|f| f.default_value(json!(0))))
                .param(ParamDecl::new("limit", "optional[int]")),
        )
        .route(
            RouteDecl::get("/search/", "search")
                .param(ParamDecl::query("q", "optional[list[str]]"))
                .param(ParamDecl::new("page", "int").with(|f| f.default_value(json!(1)))),
        )
}

#[test]
fn test_path_and_query_coercion() {
    let r = router(items_manifest());
    let bound = get(&r, "/items/5?q=somequery&short=yes").unwrap();
    assert_eq!(bound.get_i64("item_id"), Some(5));
    assert_eq!(bound.get_str("q"), Some("somequery"));
    assert_eq!(bound.get_bool("short"), Some(true));
    assert_eq!(bound.handler_name(), "read_item");
}

#[test]
fn test_absent_optional_is_null_and_default_applies() {
    let r = router(items_manifest());
    let bound = get(&r, "/items/5").unwrap();
    assert_eq!(bound.values.get("q"), Some(&Value::Null));
    assert_eq!(bound.get("q"), None);
    assert_eq!(bound.get_bool("short"), Some(false));
}

#[test]
fn test_lax_bool_strings() {
    for (raw, expected) in [
        ("1", true),
        ("True", true),
        ("on", true),
        ("yes", true),
        ("0", false),
        ("false", false),
        ("FALSE", false),
        ("", false),
    ] {
        assert_eq!(parse_lax_bool(raw), expected, "{raw:?}");
    }
}

#[test]
fn test_int_parse_failure_is_reported_at_path_loc() {
    let r = router(items_manifest());
    let err = get(&r, "/items/foo").unwrap_err();
    assert_eq!(err.issues.len(), 1);
    let issue = &err.issues[0];
    assert_eq!(issue.loc, vec![LocSegment::from("path"), LocSegment::from("item_id")]);
    assert_eq!(issue.kind, IssueKind::IntParsing);
    assert_eq!(issue.input, json!("foo"));
}

#[test]
fn test_missing_required_query() {
    let r = router(items_manifest());
    let err = get(&r, "/needy/foo").unwrap_err();
    assert_eq!(err.issues[0].kind, IssueKind::Missing);
    assert_eq!(err.issues[0].input, Value::Null);
    assert_eq!(err.issues[0].location(), "query.needy");

    let bound = get(&r, "/needy/foo?needy=sooooneedy").unwrap();
    assert_eq!(bound.get_str("needy"), Some("sooooneedy"));
    assert_eq!(bound.get_i64("skip"), Some(0));
    assert_eq!(bound.get("limit"), None);
}

#[test]
fn test_errors_aggregate_across_origins() {
    let r = router(items_manifest());
    let err = get(&r, "/needy/foo?skip=x&limit=y").unwrap_err();
    let found: Vec<String> = err.issues.iter().map(|i| i.location()).collect();
    assert_eq!(found, vec!["query.needy", "query.skip", "query.limit"]);
}

#[test]
fn test_query_list_collects_all_and_scalar_takes_last() {
    let r = router(items_manifest());
    let bound = get(&r, "/search/?q=foo&q=bar&page=2&page=3").unwrap();
    assert_eq!(bound.get("q"), Some(&json!(["foo", "bar"])));
    assert_eq!(bound.get_i64("page"), Some(3));

    let bound = get(&r, "/search/").unwrap();
    assert_eq!(bound.get("q"), None);
    assert_eq!(bound.get_i64("page"), Some(1));
}

#[test]
fn test_direct_body_binds_whole_object() {
    let r = router(items_manifest());
    let req = ParsedRequest::new(Method::PUT, "/items/3").with_json(&json!({
        "name": "Foo", "price": "35.4", "unknown": true
    }));
    let bound = run(&r, req).unwrap();
    assert_eq!(bound.route.body_layout, BodyLayout::Direct);
    assert_eq!(
        bound.get("item"),
        Some(&json!({
            "name": "Foo", "description": null, "price": 35.4, "tax": null, "tags": []
        }))
    );
}

#[test]
fn test_embed_wraps_single_body_param() {
    let r = router(items_manifest());
    let req = ParsedRequest::new(Method::PUT, "/embed/3")
        .with_json(&json!({"item": {"name": "Foo", "price": 1}}));
    let bound = run(&r, req).unwrap();
    assert_eq!(bound.route.body_layout, BodyLayout::Embedded);
    assert_eq!(bound.get("item").unwrap()["price"], json!(1.0));

    // unwrapped body is a missing item
    let req = ParsedRequest::new(Method::PUT, "/embed/3")
        .with_json(&json!({"name": "Foo", "price": 1}));
    let err = run(&r, req).unwrap_err();
    assert_eq!(err.issues[0].location(), "body.item");
    assert_eq!(err.issues[0].kind, IssueKind::Missing);
}

#[test]
fn test_multiple_body_params_are_embedded() {
    let r = router(items_manifest());
    let req = ParsedRequest::new(Method::PUT, "/multi/1").with_json(&json!({
        "item": {"name": "Foo", "price": -2},
        "user": {"username": "dave"},
        "importance": "5"
    }));
    let err = run(&r, req).unwrap_err();
    assert_eq!(
        locs(&err),
        vec![vec![
            LocSegment::from("body"),
            LocSegment::from("item"),
            LocSegment::from("price")
        ]]
    );
    assert_eq!(err.issues[0].kind, IssueKind::GreaterThan);
    assert_eq!(err.issues[0].input, json!(-2));

    let req = ParsedRequest::new(Method::PUT, "/multi/1").with_json(&json!({
        "item": {"name": "Foo", "price": 2},
        "user": {"username": "dave"},
        "importance": "5"
    }));
    let bound = run(&r, req).unwrap();
    assert_eq!(bound.get_i64("importance"), Some(5));
    assert_eq!(bound.get("user"), Some(&json!({"username": "dave"})));
}

#[test]
fn test_invalid_json_is_one_issue_and_others_still_checked() {
    let r = router(items_manifest());
    let req = ParsedRequest::new(Method::PUT, "/items/abc").with_body("{\"name\": ");
    let err = run(&r, req).unwrap_err();
    let kinds: Vec<_> = err.issues.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![IssueKind::JsonInvalid, IssueKind::IntParsing]);
    assert_eq!(err.issues[0].loc, vec![LocSegment::from("body")]);
}

#[test]
fn test_missing_direct_body() {
    let r = router(items_manifest());
    let err = run(&r, ParsedRequest::new(Method::PUT, "/items/1")).unwrap_err();
    assert_eq!(err.issues[0].loc, vec![LocSegment::from("body")]);
    assert_eq!(err.issues[0].kind, IssueKind::Missing);
}

#[test]
fn test_embedded_body_must_be_object() {
    let r = router(items_manifest());
    let req = ParsedRequest::new(Method::PUT, "/multi/1").with_json(&json!([1, 2]));
    let err = run(&r, req).unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].kind, IssueKind::ModelAttributesType);
}

#[test]
fn test_nested_list_index_in_loc() {
    let r = router(items_manifest());
    let req = ParsedRequest::new(Method::PUT, "/items/1")
        .with_json(&json!({"name": "Foo", "price": 1, "tags": ["a", 2]}));
    let err = run(&r, req).unwrap_err();
    assert_eq!(err.issues[0].location(), "body.tags.1");
    assert_eq!(err.issues[0].kind, IssueKind::StringType);
}

fn types_manifest() -> Manifest {
    Manifest::new("t")
        .enumeration("ModelName", ["alexnet", "resnet", "lenet"])
        .enumeration("HeightLabel", ["tall", "medium", "short"])
        .route(
            RouteDecl::get("/models/{model_name}", "get_model")
                .param(ParamDecl::new("model_name", "ModelName")),
        )
        .route(
            RouteDecl::post("/heights/", "heights")
                .param(ParamDecl::new("heights", "dict[int, HeightLabel]")),
        )
        .route(
            RouteDecl::put("/extra/{item_id}", "extra")
                .param(ParamDecl::new("item_id", "uuid"))
                .param(ParamDecl::body("start", "datetime"))
                .param(ParamDecl::body("repeat_at", "time"))
                .param(ParamDecl::body("process_after", "timedelta"))
                .param(ParamDecl::body("site", "optional[url]")),
        )
}

#[test]
fn test_enum_membership_and_ctx() {
    let r = router(types_manifest());
    assert_eq!(get(&r, "/models/resnet").unwrap().get_str("model_name"), Some("resnet"));
    let err = get(&r, "/models/vgg").unwrap_err();
    assert_eq!(err.issues[0].kind, IssueKind::Enum);
    assert_eq!(
        err.issues[0].msg,
        "Input should be 'alexnet', 'resnet' or 'lenet'"
    );
    assert_eq!(
        err.issues[0].ctx,
        Some(json!({"expected": "'alexnet', 'resnet' or 'lenet'"}))
    );
}

#[test]
fn test_dict_keys_coerced() {
    let r = router(types_manifest());
    let req = ParsedRequest::new(Method::POST, "/heights/")
        .with_json(&json!({"01": "tall", "2": "short"}));
    let bound = run(&r, req).unwrap();
    assert_eq!(bound.get("heights"), Some(&json!({"1": "tall", "2": "short"})));

    let req = ParsedRequest::new(Method::POST, "/heights/")
        .with_json(&json!({"x": "tall", "3": "giant"}));
    let err = run(&r, req).unwrap_err();
    let kinds: Vec<_> = err.issues.iter().map(|i| i.kind).collect();
    assert!(kinds.contains(&IssueKind::IntParsing));
    assert!(kinds.contains(&IssueKind::Enum));
}

#[test]
fn test_extra_types_normalized() {
    let r = router(types_manifest());
    let req = ParsedRequest::new(Method::PUT, "/extra/3FA85F64-5717-4562-B3FC-2C963F66AFA6")
        .with_json(&json!({
            "start": "2008-09-15T15:53:00",
            "repeat_at": "14:23",
            "process_after": 3600,
            "site": "https://example.com/x"
        }));
    let bound = run(&r, req).unwrap();
    assert_eq!(
        bound.get_str("item_id"),
        Some("3fa85f64-5717-4562-b3fc-2c963f66afa6")
    );
    assert_eq!(bound.get_str("start"), Some("2008-09-15T15:53:00+00:00"));
    assert_eq!(bound.get_str("repeat_at"), Some("14:23:00"));
    assert_eq!(bound.get_str("process_after"), Some("PT1H"));
    assert_eq!(bound.get_str("site"), Some("https://example.com/x"));
}

#[test]
fn test_extra_types_rejected() {
    let r = router(types_manifest());
    let req = ParsedRequest::new(Method::PUT, "/extra/not-a-uuid").with_json(&json!({
        "start": "soon",
        "repeat_at": "25:61",
        "process_after": "forever",
        "site": "ftp://example.com"
    }));
    let err = run(&r, req).unwrap_err();
    let kinds: Vec<_> = err.issues.iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            IssueKind::UuidParsing,
            IssueKind::DatetimeParsing,
            IssueKind::TimeParsing,
            IssueKind::TimeDeltaParsing,
            IssueKind::UrlScheme,
        ]
    );
}

#[test]
fn test_extract_into_struct() {
    #[derive(serde::Deserialize)]
    struct ReadItem {
        item_id: i64,
        q: Option<String>,
        short: bool,
    }
    let r = router(items_manifest());
    let bound = get(&r, "/items/7?short=0").unwrap();
    let typed: ReadItem = bound.extract().unwrap();
    assert_eq!(typed.item_id, 7);
    assert_eq!(typed.q, None);
    assert!(!typed.short);
}

#[test]
fn test_classification_errors() {
    let model = ModelDecl::new().field(FieldDecl::new("a", "int"));

    let m = Manifest::new("t")
        .model("M", model.clone())
        .route(RouteDecl::get("/x", "x").param(ParamDecl::query("m", "M")));
    assert!(matches!(
        build_routes(&m),
        Err(RegistrationError::UnsupportedLocation { location: ParameterLocation::Query, .. })
    ));

    let m = Manifest::new("t").route(RouteDecl::get("/x", "x").param(ParamDecl::path("id", "int")));
    assert!(matches!(
        build_routes(&m),
        Err(RegistrationError::UnknownPathParameter { .. })
    ));

    let m = Manifest::new("t")
        .route(RouteDecl::get("/x/{id}", "x").param(ParamDecl::query("id", "int")));
    assert!(matches!(
        build_routes(&m),
        Err(RegistrationError::ConflictingLocation { .. })
    ));

    let m = Manifest::new("t")
        .route(RouteDecl::get("/x", "x").param(ParamDecl::cookie("ids", "list[int]")));
    assert!(matches!(
        build_routes(&m),
        Err(RegistrationError::UnsupportedLocation { location: ParameterLocation::Cookie, .. })
    ));
}

#[test]
fn test_explicit_body_scalar_and_default_classification() {
    let table = build_routes(&items_manifest()).unwrap();
    let multi = &table.routes[2];
    let locations: Vec<_> = multi.parameters.iter().map(|p| p.location).collect();
    assert_eq!(
        locations,
        vec![
            ParameterLocation::Path,
            ParameterLocation::Body,
            ParameterLocation::Body,
            ParameterLocation::Body
        ]
    );
    assert!(multi.parameters[3].explicit);
    assert!(!multi.parameters[1].explicit);
}
