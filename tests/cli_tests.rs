//! The `bindrouter` binary, run as a subprocess

use std::io::Write;
use std::process::{Command, Output};

fn bindrouter(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bindrouter"))
        .args(args)
        .env_remove("BINDR_ROUTES")
        .env("BINDR_LOG_LEVEL", "error")
        .output()
        .expect("run bindrouter")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_cli_inspect_tutorial() {
    let output = bindrouter(&["inspect"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Tutorial API (23 routes, first match wins)"));
    assert!(text.contains("GET /files/{file_path:path} -> read_files"));
    assert!(text.contains("q: optional[str] in query as \"item-query\" optional deprecated"));
}

#[test]
fn test_cli_request_success_and_validation() {
    let output = bindrouter(&["request", "GET", "/models/lenet"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("200\n"));
    assert!(text.contains("LeCNN all the images"));

    let output = bindrouter(&[
        "request",
        "POST",
        "/index-heights",
        "--body",
        r#"{"weights": {"one": "tall"}}"#,
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("422\n"));
    assert!(text.contains("\"int_parsing\""));
}

#[test]
fn test_cli_request_against_manifest_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"title":"Mini","routes":[{{"method":"GET","path":"/echo/{{word}}","handler":"say"}}]}}"#
    )
    .unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let output = bindrouter(&["request", "GET", "/echo/hi%20there", "--routes", &path]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("\"word\": \"hi there\""));
}

#[test]
fn test_cli_bad_manifest_fails() {
    let output = bindrouter(&["inspect", "--routes", "/no/such/routes.yaml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read route manifest"));
}

#[test]
fn test_cli_body_limit_from_env() {
    let output = Command::new(env!("CARGO_BIN_EXE_bindrouter"))
        .args(["request", "POST", "/index-heights", "--body", r#"{"weights": {}}"#])
        .env_remove("BINDR_ROUTES")
        .env("BINDR_MAX_BODY_BYTES", "4")
        .env("BINDR_LOG_LEVEL", "error")
        .output()
        .unwrap();
    assert!(stdout(&output).starts_with("413\n"));
}
