//! Integration tests for the swh-deposit binary.
//!
//! These tests only exercise the offline commands; nothing here talks to
//! a deposit service.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Helper to get the binary command for testing.
fn get_cmd() -> Command {
    let mut cmd = Command::cargo_bin("swh-deposit").unwrap();
    cmd.env_remove("SWH_DEPOSIT_URL")
        .env_remove("SWH_DEPOSIT_USERNAME")
        .env_remove("SWH_DEPOSIT_PASSWORD");
    cmd
}

#[test]
fn test_metadata_command_writes_entry() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("codemeta.json");
    let output = dir.path().join("atom.xml");
    fs::write(
        &input,
        json!({
            "@context": "https://doi.org/10.5063/schema/codemeta-2.0",
            "name": "Example",
            "author": { "givenName": "Grace", "familyName": "Hopper" }
        })
        .to_string(),
    )
    .unwrap();

    get_cmd()
        .arg("metadata")
        .arg("--codemeta")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--fill-missing")
        .assert()
        .success();

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("<codemeta:name>Example</codemeta:name>"));
    assert!(xml.contains("<codemeta:name>Grace Hopper</codemeta:name>"));
    assert!(!xml.contains("@context"));

    get_cmd()
        .arg("validate")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid Atom entry"));
}

#[test]
fn test_metadata_command_prints_to_stdout() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("codemeta.json");
    fs::write(&input, r#"{"name": "Example"}"#).unwrap();

    get_cmd()
        .arg("metadata")
        .arg("--codemeta")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<entry xmlns="http://www.w3.org/2005/Atom" xmlns:codemeta="https://doi.org/10.5063/SCHEMA/CODEMETA-2.0">"#,
        ));
}

#[test]
fn test_metadata_command_rejects_invalid_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("codemeta.json");
    fs::write(&input, "{ not json").unwrap();

    get_cmd()
        .arg("metadata")
        .arg("--codemeta")
        .arg(&input)
        .assert()
        .failure();
}

#[test]
fn test_validate_rejects_foreign_root() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("feed.xml");
    fs::write(&file, r#"<feed xmlns="http://www.w3.org/2005/Atom"/>"#).unwrap();

    get_cmd()
        .arg("validate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Root element must be 'entry'"));
}

#[test]
fn test_remote_commands_need_credentials() {
    get_cmd()
        .arg("status")
        .arg("test")
        .arg("42")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing url"));
}

#[test]
fn test_fill_missing_needs_codemeta() {
    let dir = tempdir().unwrap();
    let atom = dir.path().join("atom.xml");
    fs::write(&atom, r#"<entry xmlns="http://www.w3.org/2005/Atom"/>"#).unwrap();

    get_cmd()
        .arg("create")
        .arg("test")
        .arg("--atom")
        .arg(&atom)
        .arg("--fill-missing")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--codemeta"));
}
