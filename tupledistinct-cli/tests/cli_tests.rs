use serde_json::{json, Value};
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;

fn tupledistinct(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tupledistinct"))
        .args(args)
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn export_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let data = json!({
        "people": [
            {"name": "Ann", "address": {"city": "Oslo"}},
            {"name": "Bob", "address": {"city": "Lima"}},
            {"name": "Cid", "address": {"city": "Oslo"}},
            {"name": "Dee"}
        ],
        "empty": []
    });
    write!(file, "{}", data).unwrap();
    file
}

#[test]
fn test_collection_single_path() {
    let file = export_file();
    let path = file.path().to_str().unwrap();
    let output = tupledistinct(&["collection", path, "--collection", "people", "-p", "address.city"]);
    assert_eq!(stdout_json(&output), json!(["Oslo", "Lima"]));
}

#[test]
fn test_collection_tuples_with_count() {
    let file = export_file();
    let path = file.path().to_str().unwrap();
    let output = tupledistinct(&[
        "collection",
        path,
        "--collection",
        "people",
        "-p",
        "address.city",
        "--path",
        "missing",
        "--count",
    ]);
    assert_eq!(stdout_json(&output), json!([["Oslo", null, 2], ["Lima", null, 1]]));
}

#[test]
fn test_collection_empty() {
    let file = export_file();
    let path = file.path().to_str().unwrap();
    let output = tupledistinct(&["collection", path, "--collection", "empty", "-p", "a"]);
    assert_eq!(stdout_json(&output), json!([]));
}

#[test]
fn test_collection_unknown_name_fails() {
    let file = export_file();
    let path = file.path().to_str().unwrap();
    let output = tupledistinct(&["collection", path, "--collection", "nope", "-p", "a"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope"));
}

#[test]
fn test_collection_with_exported_object_ids() {
    let mut file = NamedTempFile::new().unwrap();
    let data = json!({
        "orders": [
            {"_id": {"$oid": "5f1d7f0000000000000000a1"}, "status": "open"},
            {"_id": {"$oid": "5f1d7f0000000000000000a2"}, "status": "open"},
            {"_id": {"$oid": "5f1d7f0000000000000000a3"}, "status": "done"}
        ]
    });
    write!(file, "{}", data).unwrap();

    let path = file.path().to_str().unwrap();
    let output = tupledistinct(&["collection", path, "--collection", "orders", "-p", "status", "--count"]);
    assert_eq!(stdout_json(&output), json!([["open", 2], ["done", 1]]));
}

#[test]
fn test_stream_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", json!({"a": 1, "b": "x"})).unwrap();
    writeln!(file, "{}", json!({"a": 1, "b": "x"})).unwrap();
    writeln!(file, "{}", json!({"a": 2})).unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    let output = tupledistinct(&["stream", path, "-p", "a", "-p", "b", "--count", "--pretty"]);
    assert_eq!(stdout_json(&output), json!([[1, "x", 2], [2, null, 1]]));
}

#[test]
fn test_stream_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tupledistinct"))
        .args(["stream", "-", "-p", "k"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin.write_all(b"{\"k\": 3}\n{\"k\": 3}\n{\"k\": 4}\n").unwrap();
    }
    let output = child.wait_with_output().unwrap();
    assert_eq!(stdout_json(&output), json!([3, 4]));
}

#[test]
fn test_stream_bad_line_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{{\"a\": 1}}").unwrap();
    writeln!(file, "oops").unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    let output = tupledistinct(&["stream", path, "-p", "a"]);
    assert!(!output.status.success());
}

#[test]
fn test_settings_file_and_log_level() {
    let mut settings = NamedTempFile::new().unwrap();
    write!(settings, "{}", json!({"status_interval_ms": 0})).unwrap();
    settings.flush().unwrap();

    let file = export_file();
    let output = tupledistinct(&[
        "collection",
        file.path().to_str().unwrap(),
        "--collection",
        "people",
        "-p",
        "name",
        "--config",
        settings.path().to_str().unwrap(),
        "--log-level",
        "debug",
    ]);
    assert_eq!(stdout_json(&output), json!(["Ann", "Bob", "Cid", "Dee"]));

    let output = tupledistinct(&[
        "collection",
        file.path().to_str().unwrap(),
        "--collection",
        "people",
        "-p",
        "name",
        "--log-level",
        "loud",
    ]);
    assert!(!output.status.success());
}
