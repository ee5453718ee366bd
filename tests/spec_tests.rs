//! Manifest loading and registration-time rejection

use bindrouter::spec::{
    build_routes, load_routes, parse_manifest, BodyLayout, FieldDecl, Manifest, ModelDecl,
    ParamDecl, ParameterLocation, RegistrationError, RouteDecl,
};
use serde_json::json;
use std::io::Write;

fn register(yaml: &str) -> Result<bindrouter::RouteTable, RegistrationError> {
    build_routes(&parse_manifest(yaml, true).expect("manifest parses"))
}

#[test]
fn test_load_routes_from_yaml_and_json_files() {
    let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        yaml,
        "title: Files\nroutes:\n  - {{ method: GET, path: '/a/{{id}}', handler: a }}\n"
    )
    .unwrap();
    let table = load_routes(yaml.path()).unwrap();
    assert_eq!(table.title, "Files");
    assert_eq!(table.routes[0].parameters[0].location, ParameterLocation::Path);

    let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        json_file,
        r#"{{"title":"Files","routes":[{{"method":"POST","path":"/b","handler":"b",
            "parameters":[{{"name":"tags","type":"list[str]"}}]}}]}}"#
    )
    .unwrap();
    let table = load_routes(json_file.path()).unwrap();
    assert_eq!(table.routes[0].parameters[0].location, ParameterLocation::Body);
    assert_eq!(table.routes[0].body_layout, BodyLayout::Direct);
}

#[test]
fn test_load_routes_reports_file_context() {
    let mut bad = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(bad, "routes:\n  - {{ method: GET, path: /a, handler: a, parameters: [{{ name: x, type: widget }}] }}\n").unwrap();
    let err = load_routes(bad.path()).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("failed to register routes"));
    assert!(chain.contains("widget"));

    assert!(load_routes("/definitely/not/here.yaml").is_err());
}

#[test]
fn test_builders_match_manifest_file() {
    let built = Manifest::new("Items")
        .enumeration("Color", ["red", "green"])
        .model(
            "Item",
            ModelDecl::new()
                .field(FieldDecl::new("name", "str"))
                .field(FieldDecl::new("price", "float").gt(0.0)),
        )
        .route(
            RouteDecl::put("/items/{item_id}", "update_item")
                .param(ParamDecl::new("item_id", "int"))
                .param(ParamDecl::new("item", "Item"))
                .param(ParamDecl::query("color", "Color").with(|f| f.default_value(json!("red")))),
        );
    let parsed = parse_manifest(
        r#"
title: Items
enums:
  Color: [red, green]
models:
  Item:
    fields:
      - { name: name, type: str }
      - { name: price, type: float, gt: 0 }
routes:
  - method: PUT
    path: /items/{item_id}
    handler: update_item
    parameters:
      - { name: item_id, type: int }
      - { name: item, type: Item }
      - { name: color, type: Color, in: query, default: red }
"#,
        true,
    )
    .unwrap();
    assert_eq!(built, parsed);
}

#[test]
fn test_registration_rejects_bad_declarations() {
    let cases: &[(&str, fn(&RegistrationError) -> bool)] = &[
        (
            "routes: [{ method: GET, path: 'items/{id}', handler: h }]",
            |e| matches!(e, RegistrationError::MalformedTemplate { .. }),
        ),
        (
            "routes: [{ method: 'GE T', path: /items, handler: h }]",
            |e| matches!(e, RegistrationError::UnknownMethod { .. }),
        ),
        (
            "routes: [{ method: GET, path: /items, handler: h, parameters: [{ name: q, type: 'list[widget]' }] }]",
            |e| matches!(e, RegistrationError::UnhandledType { .. }),
        ),
        (
            "routes: [{ method: GET, path: /items, handler: h, parameters: [{ name: q, type: 'dict[Item, int]' }] }]\nmodels: { Item: { fields: [] } }",
            |e| matches!(e, RegistrationError::InvalidTypeExpression { .. }),
        ),
        (
            "routes: [{ method: GET, path: /items, handler: h, parameters: [{ name: q, type: str, pattern: '([' }] }]",
            |e| matches!(e, RegistrationError::InvalidPattern { .. }),
        ),
        (
            "routes: [{ method: GET, path: /items, handler: h, parameters: [{ name: q, type: str }, { name: q, type: int }] }]",
            |e| matches!(e, RegistrationError::DuplicateField { .. }),
        ),
        (
            "routes: [{ method: GET, path: /items, handler: h, parameters: [{ name: id, type: int, in: path }] }]",
            |e| matches!(e, RegistrationError::UnknownPathParameter { .. }),
        ),
        (
            "routes: [{ method: GET, path: '/items/{id}', handler: h, parameters: [{ name: id, type: int, in: query }] }]",
            |e| matches!(e, RegistrationError::ConflictingLocation { .. }),
        ),
        (
            "routes: [{ method: GET, path: /items, handler: h, parameters: [{ name: tags, type: 'list[str]', in: cookie }] }]",
            |e| matches!(e, RegistrationError::UnsupportedLocation { .. }),
        ),
        (
            "routes: [{ method: GET, path: /items, handler: h, parameters: [{ name: n, type: int, default: abc }] }]",
            |e| matches!(e, RegistrationError::InvalidDefault { .. }),
        ),
        (
            "enums: { Empty: [] }\nroutes: []",
            |e| matches!(e, RegistrationError::EmptyEnum { .. }),
        ),
    ];
    for (yaml, check) in cases {
        match register(yaml) {
            Ok(_) => panic!("expected registration to fail for:\n{yaml}"),
            Err(err) => assert!(check(&err), "unexpected error {err} for:\n{yaml}"),
        }
    }
}

#[test]
fn test_recursive_models_register() {
    let table = register(
        r#"
models:
  Node:
    fields:
      - { name: value, type: int }
      - { name: children, type: "list[Node]", default: [] }
routes:
  - { method: POST, path: /tree, handler: tree, parameters: [{ name: root, type: Node }] }
"#,
    )
    .unwrap();
    assert!(table.types.get_model("Node").is_some());
}
