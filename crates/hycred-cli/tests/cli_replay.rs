//! # hycred Binary Tests
//!
//! Runs the compiled `hycred` binary against scripts written to temporary
//! directories and against the bundled demo scripts.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

fn hycred() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hycred"));
    for var in [
        "MAX_CARBON_INTENSITY",
        "MIN_VERIFICATION_COUNT",
        "CREDIT_EXPIRY_DAYS",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

fn replay_to_json(script: &Path, extra: &[&str]) -> (i32, Value) {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.json");
    let status = hycred()
        .arg("replay")
        .arg(script)
        .arg("--output")
        .arg(&out)
        .args(extra)
        .status()
        .unwrap();
    let report: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    (status.code().unwrap(), report)
}

#[test]
fn lifecycle_demo_matches_expectations() {
    let (code, report) = replay_to_json(&demo("lifecycle.yaml"), &["--events"]);
    assert_eq!(code, 0, "{report:#}");
    assert_eq!(report["mismatches"], 0);
    let credit = &report["snapshot"]["credits"][0];
    assert_eq!(credit["owner"], "steelworks");
    assert_eq!(credit["lifecycle"], "RETIRED");
    assert_eq!(credit["retirement_reason"], "offset");
    assert!(report["notifications"].as_array().unwrap().len() >= 4);
}

#[test]
fn batch_demo_matches_expectations() {
    let (code, report) = replay_to_json(&demo("batch.yaml"), &[]);
    assert_eq!(code, 0, "{report:#}");
    let batch = &report["snapshot"]["batches"][0];
    assert_eq!(batch["verified"], true);
    assert_eq!(batch["total_amount"], 1000);
    assert_eq!(batch["verifiers"].as_array().unwrap().len(), 2);
    assert!(report.get("notifications").is_none());
}

#[test]
fn mismatch_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("bad.yaml");
    std::fs::write(
        &script,
        r#"
regulator: regulator
steps:
  - op: retire_credit
    caller: someone
    credit: 1
    reason: offset
"#,
    )
    .unwrap();
    let (code, report) = replay_to_json(&script, &[]);
    assert_eq!(code, 1);
    assert_eq!(report["steps"][0]["error"], "not_found");
    assert_eq!(report["steps"][0]["matched"], false);
}

#[test]
fn malformed_script_fails_without_report() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("broken.yaml");
    std::fs::write(&script, "regulator: [unclosed\n").unwrap();
    let status = hycred().arg("replay").arg(&script).status().unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn environment_config_applies_to_replay() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("ci.yaml");
    std::fs::write(
        &script,
        r#"
regulator: regulator
steps:
  - op: issue_credit
    caller: regulator
    owner: p
    producer: p
    amount: 1
    carbon_intensity: 30
    expect: invalid_argument
"#,
    )
    .unwrap();
    let out = dir.path().join("report.json");
    let status = hycred()
        .env("MAX_CARBON_INTENSITY", "20")
        .arg("replay")
        .arg(&script)
        .arg("--output")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn config_command_prints_environment() {
    let output = hycred()
        .env("MIN_VERIFICATION_COUNT", "4")
        .arg("config")
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["min_verification_count"], 4);
    assert_eq!(value["max_carbon_intensity"], 50);
}

#[test]
fn config_command_rejects_garbage() {
    let output = hycred()
        .env("CREDIT_EXPIRY_DAYS", "a year")
        .arg("config")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}
