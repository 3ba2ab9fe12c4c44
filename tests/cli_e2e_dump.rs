//! End-to-end tests for the `dump` command.

mod common;
use common::prelude::*;

#[test]
fn test_dump_yaml_stdout() {
    let fixture = TestFixture::sample();
    fixture
        .command()
        .arg("dump")
        .assert()
        .success()
        .stdout(predicate::str::contains("workbench: oss"))
        .stdout(predicate::str::contains("tool-layout:"))
        .stdout(predicate::str::contains("- name: protoc"))
        .stdout(predicate::str::contains("legacy").not());
}

#[test]
fn test_dump_json_to_file() {
    let fixture = TestFixture::sample();
    fixture
        .command()
        .args(["dump", "--format", "json", "--out", "out/bundle.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[WRITE]"));

    let written = std::fs::read_to_string(fixture.path().join("out/bundle.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["version"], "2.1");
    assert_eq!(value["layout"], serde_json::json!([["zlib"], ["openssl"], ["curl"]]));

    let curl = value["packages"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "curl")
        .unwrap();
    assert_eq!(curl["program"]["Linux"], serde_json::json!(["curl"]));
    assert_eq!(curl["profiles"], serde_json::json!(["gcc5", "gcc8"]));

    let zlib = &value["packages"][0];
    assert_eq!(zlib["needs_tool_config"], true);
    assert_eq!(zlib["tool_used_by"], serde_json::json!(["protoc"]));
}

#[test]
fn test_dump_invalid_format() {
    let fixture = TestFixture::sample();
    fixture
        .command()
        .args(["dump", "--format", "toml"])
        .assert()
        .failure();
}
