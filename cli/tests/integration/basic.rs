//! Basic functionality integration tests for the pipecp CLI.

use assert_cmd::cargo::cargo_bin_cmd;
use httpmock::prelude::*;
use httpmock::Method::HEAD;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_basic_file_copy() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "hello world").unwrap();

    let mut cmd = cargo_bin_cmd!("pipecp");
    cmd.arg(src.path().join("test.txt"))
        .arg(dst.path().join("test.txt"))
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied"));

    assert_eq!(
        fs::read_to_string(dst.path().join("test.txt")).unwrap(),
        "hello world"
    );
}

#[test]
fn test_json_output() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "hello world").unwrap();

    let mut cmd = cargo_bin_cmd!("pipecp");
    let assert = cmd
        .arg(src.path().join("test.txt"))
        .arg(dst.path().join("test.txt"))
        .args(["--output", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["stat"]["transferred"], 11);
    assert_eq!(value["data"], serde_json::Value::Null);
}

#[test]
fn test_http_source_copy() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(HEAD).path("/note.txt");
        then.status(200)
            .header("content-length", "11")
            .header("content-type", "text/plain");
    });
    server.mock(|when, then| {
        when.method(GET).path("/note.txt");
        then.status(200).body("hello world");
    });

    let dst = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("pipecp");
    cmd.arg(server.url("/note.txt"))
        .arg(dst.path().join("note.txt"))
        .arg("--quiet")
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dst.path().join("note.txt")).unwrap(),
        "hello world"
    );
}

#[test]
fn test_missing_source_exits_with_resolution_code() {
    let dst = TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("pipecp");
    cmd.arg(dst.path().join("nonexistent.bin"))
        .arg(dst.path().join("out.bin"))
        .arg("--quiet")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("stat"));
}

#[test]
fn test_malformed_header_exits_with_validation_code() {
    let dst = TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("pipecp");
    cmd.arg("https://example.com/a.bin")
        .arg(dst.path().join("out.bin"))
        .args(["--header", "no-separator"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Malformed header"));
}

#[test]
fn test_missing_operand_fails() {
    let mut cmd = cargo_bin_cmd!("pipecp");
    cmd.arg("only-one-operand").assert().failure();
}
