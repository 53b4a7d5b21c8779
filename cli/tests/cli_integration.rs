//! Integration tests for the diff, show, and merge flows.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn schema_drift_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_schema-drift"))
}

fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

const USERS_DDL: &str = "CREATE TABLE users (id INT NOT NULL, name TEXT NOT NULL);";

#[test]
fn test_show_outputs_parsed_schema_json() {
    let dir = tempfile::tempdir().unwrap();
    let ddl = write_fixture(dir.path(), "users.sql", USERS_DDL);

    let output = Command::new(schema_drift_bin())
        .arg("show")
        .arg(&ddl)
        .output()
        .expect("failed to run schema-drift");

    assert!(
        output.status.success(),
        "show failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid JSON output: {e}\n{stdout}"));
    assert_eq!(parsed["label"], "users");
    assert_eq!(parsed["required"][0], "id");
}

#[test]
fn test_diff_exit_codes_and_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let left = write_fixture(dir.path(), "left.sql", USERS_DDL);
    let same = write_fixture(dir.path(), "same.sql", USERS_DDL);
    let changed = write_fixture(
        dir.path(),
        "changed.sql",
        "CREATE TABLE users (id TEXT NOT NULL, name TEXT NOT NULL);",
    );

    let matching = Command::new(schema_drift_bin())
        .arg("diff")
        .arg(&left)
        .arg(&same)
        .output()
        .expect("failed to run schema-drift");
    assert_eq!(matching.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&matching.stdout).contains("match"));

    let drifted = Command::new(schema_drift_bin())
        .arg("diff")
        .arg(&left)
        .arg(&changed)
        .output()
        .expect("failed to run schema-drift");
    assert_eq!(drifted.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&drifted.stdout);
    assert!(stdout.contains("type mismatches"), "{stdout}");
    assert!(stdout.contains("id: int -> str"), "{stdout}");
}

#[test]
fn test_diff_json_report_across_dialects() {
    let dir = tempfile::tempdir().unwrap();
    let ddl = write_fixture(dir.path(), "users.sql", USERS_DDL);
    let samples = write_fixture(
        dir.path(),
        "samples.ndjson",
        "{\"id\": 1, \"name\": \"ada\", \"extra\": true}\n",
    );

    let output = Command::new(schema_drift_bin())
        .args(["diff", "--format", "json"])
        .arg(&ddl)
        .arg(&samples)
        .output()
        .expect("failed to run schema-drift");

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid JSON output: {e}\n{stdout}"));
    assert_eq!(report["only_in_right"][0], "extra");
    assert!(report["type_mismatches"].as_array().unwrap().is_empty());
}

#[test]
fn test_merge_combines_sample_files() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_fixture(dir.path(), "a.ndjson", "{\"a\": 1}\n");
    let second = write_fixture(dir.path(), "b.ndjson", "{\"a\": \"x\", \"b\": true}\n");

    let output = Command::new(schema_drift_bin())
        .arg("merge")
        .arg(&first)
        .arg(&second)
        .output()
        .expect("failed to run schema-drift");

    assert!(
        output.status.success(),
        "merge failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let merged: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid JSON output: {e}\n{stdout}"));
    // `a` was seen as int and str; `b` only in the second file.
    let root = merged["root"]["object"]
        .as_object()
        .unwrap_or_else(|| panic!("unexpected tree shape: {stdout}"));
    assert!(root.contains_key("a"));
    assert!(root.contains_key("b"));
}

#[test]
fn test_missing_file_reports_error_and_exit_one() {
    let output = Command::new(schema_drift_bin())
        .args(["show", "/nonexistent/path.sql"])
        .output()
        .expect("failed to run schema-drift");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}
