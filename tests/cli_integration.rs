// CLI integration tests for check/decode flows and exit codes.
use std::path::Path;
use std::process::Command;

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_sideload");
    Command::new(exe)
}

fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path.to_str().expect("utf8 path").to_string()
}

fn parse_json(output: &[u8]) -> Value {
    let text = std::str::from_utf8(output).expect("utf8");
    serde_json::from_str(text.trim()).expect("valid json")
}

const SCHEMA: &str = r#"{"models": [
    {"type": "article", "plural": "articles", "fields": ["title"]},
    {"type": "person", "plural": "people"}
]}"#;

#[test]
fn check_reports_document_shape() {
    let temp = tempfile::tempdir().expect("tempdir");
    let doc = write_file(
        temp.path(),
        "doc.json",
        r#"{"data": [{"type": "article", "id": "1"}, {"type": "article", "id": "2"}],
            "included": [{"type": "person", "id": "9"}]}"#,
    );

    let output = cmd().args(["check", "--json", doc.as_str()]).output().expect("check");
    assert!(output.status.success());
    let report = parse_json(&output.stdout);
    assert_eq!(report["status"], "ok");
    assert_eq!(report["primary"], 2);
    assert_eq!(report["included"], 1);
}

#[test]
fn check_fails_on_error_document_with_upstream_payload() {
    let temp = tempfile::tempdir().expect("tempdir");
    let doc = write_file(
        temp.path(),
        "errors.json",
        r#"{"errors": [{"status": "503", "title": "down"}]}"#,
    );

    let output = cmd().args(["check", doc.as_str()]).output().expect("check");
    assert_eq!(output.status.code(), Some(4));
    let report = parse_json(&output.stderr);
    assert_eq!(report["error"]["kind"], "UpstreamErrors");
    assert_eq!(report["error"]["upstream"][0]["status"], "503");
    assert_eq!(report["error"]["http_status"], 400);
}

#[test]
fn decode_resolves_included_relationships() {
    let temp = tempfile::tempdir().expect("tempdir");
    let schema = write_file(temp.path(), "models.json", SCHEMA);
    let doc = write_file(
        temp.path(),
        "doc.json",
        r#"{
            "data": {
                "type": "article",
                "id": "1",
                "attributes": {"title": "hello", "dropped": true},
                "relationships": {"author": {"data": {"type": "person", "id": "9"}}}
            },
            "included": [{"type": "person", "id": "9", "attributes": {"name": "sam"}}]
        }"#,
    );

    let output = cmd()
        .args(["decode", doc.as_str(), "--schema", schema.as_str(), "--type", "articles"])
        .output()
        .expect("decode");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let decoded = parse_json(&output.stdout);
    assert_eq!(decoded["type"], "article");
    assert_eq!(decoded["id"], "1");
    assert_eq!(decoded["title"], "hello");
    // "dropped" is not a declared field for article
    assert!(decoded.get("dropped").is_none());
    assert_eq!(decoded["author"]["type"], "person");
    assert_eq!(decoded["author"]["name"], "sam");
}

#[test]
fn decode_unknown_type_is_conflict_exit() {
    let temp = tempfile::tempdir().expect("tempdir");
    let schema = write_file(temp.path(), "models.json", SCHEMA);
    let doc = write_file(
        temp.path(),
        "doc.json",
        r#"{"data": {"type": "widget", "id": "1"}}"#,
    );

    let output = cmd()
        .args(["decode", doc.as_str(), "--schema", schema.as_str()])
        .output()
        .expect("decode");
    assert_eq!(output.status.code(), Some(8));
    let report = parse_json(&output.stderr);
    assert_eq!(report["error"]["kind"], "UnknownType");
    assert_eq!(report["error"]["type"], "widget");
    assert_eq!(report["error"]["http_status"], 409);
    assert!(report["error"]["hint"].as_str().unwrap().contains("--schema"));
}

#[test]
fn decode_missing_id_suggests_opt_out() {
    let temp = tempfile::tempdir().expect("tempdir");
    let schema = write_file(temp.path(), "models.json", SCHEMA);
    let doc = write_file(
        temp.path(),
        "draft.json",
        r#"{"data": {"type": "article", "attributes": {"title": "draft"}}}"#,
    );

    let output = cmd()
        .args(["decode", doc.as_str(), "--schema", schema.as_str()])
        .output()
        .expect("decode");
    assert_eq!(output.status.code(), Some(7));
    let report = parse_json(&output.stderr);
    assert_eq!(report["error"]["kind"], "MissingId");
    assert!(
        report["error"]["hint"]
            .as_str()
            .unwrap()
            .contains("--allow-missing-id")
    );

    let output = cmd()
        .args(["decode", doc.as_str(), "--schema", schema.as_str(), "--allow-missing-id"])
        .output()
        .expect("decode");
    assert!(output.status.success());
    let decoded = parse_json(&output.stdout);
    assert_eq!(decoded["title"], "draft");
    assert!(decoded.get("id").is_none());
}

#[test]
fn usage_exit_code_without_args() {
    let output = cmd().output().expect("run");
    assert_eq!(output.status.code(), Some(2));
}
