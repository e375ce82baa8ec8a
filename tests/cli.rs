//! Tests for the schema-datagen binary.

use std::process::Command;
use tempfile::TempDir;

fn datagen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_schema-datagen"))
}

#[test]
fn test_generate_writes_jsonl_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("products.jsonl");

    let status = datagen()
        .args(["generate", "--schema", "tests/fixtures/record.yaml"])
        .args(["--seed", "3", "--count", "12", "--output"])
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 12);
    for line in lines {
        let json: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(json.get("id").and_then(|id| id.as_i64()).is_some());
    }
}

#[test]
fn test_generate_stdout_seed_from_env() {
    let run = || {
        datagen()
            .args(["generate", "-s", "tests/fixtures/geojson.yaml", "-n", "4"])
            .env("SCHEMA_DATAGEN_SEED", "99")
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();

    assert!(first.status.success());
    assert_eq!(String::from_utf8_lossy(&first.stdout).lines().count(), 4);
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_validate_reports_unknown_strategy() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("custom.yaml");
    std::fs::write(
        &schema,
        "version: 1\nroot:\n  kind: custom\n  strategy: phone_number\n  target: string\n",
    )
    .unwrap();

    let output = datagen()
        .args(["validate", "--schema"])
        .arg(&schema)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("phone_number"), "stderr: {stderr}");
}

#[test]
fn test_validate_and_roundtrip_fixture() {
    let output = datagen()
        .args(["validate", "--schema", "tests/fixtures/citm.yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("is valid"));

    let output = datagen()
        .args(["roundtrip", "--schema", "tests/fixtures/citm.yaml", "-n", "50"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("50 values round-tripped"));
}
