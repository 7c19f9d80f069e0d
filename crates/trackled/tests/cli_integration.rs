//! Integration tests for the `trackled` binary.
//!
//! These tests exercise the CLI binary via `assert_cmd`. Every invocation
//! passes `--config` pointing into a temp dir so the user's real config is
//! never read.

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("trackled")
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("trackled"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_run_help_lists_signal_flags() {
    cli()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--low-voltage"))
        .stdout(predicate::str::contains("--gsm-mode"));
}

// ── config ──

#[test]
fn cli_config_json_produces_valid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "config.toml", "device_type = \"GS08\"\n");
    let output = cli()
        .args(["--json", "--config"])
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("config --json should produce valid JSON");
    assert!(json["settings"].is_object());
    assert_eq!(json["settings"]["device_type"], "GS08");
    assert_eq!(json["config_file_exists"], true);
    assert_eq!(json["power_led"], true);
}

#[test]
fn cli_config_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("not found, using defaults"))
        .stdout(predicate::str::contains("GS06"));
}

#[test]
fn cli_config_reports_invalid_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "config.toml", "gsm_mode = \"blink\"\n");
    cli()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid gsm_mode"));
}

// ── simulate ──

#[test]
fn cli_simulate_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = write_file(
        dir.path(),
        "scenario.toml",
        "device_type = \"GS06\"\n[[step]]\nduration_ms = 7000\n",
    );
    let output = cli()
        .args(["--json", "simulate"])
        .arg(&scenario)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["ticks"], 700);
    assert_eq!(json["writes"]["gsm"], 70);
    assert_eq!(json["writes"]["gps"], 70);
}

#[test]
fn cli_simulate_text_summary() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = write_file(
        dir.path(),
        "scenario.toml",
        "[[step]]\nduration_ms = 300\ngps_mode = \"on\"\n",
    );
    cli()
        .arg("simulate")
        .arg(&scenario)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ticks:"))
        .stdout(predicate::str::contains("Transitions:"));
}

#[test]
fn cli_simulate_quiet_omits_transitions() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = write_file(dir.path(), "scenario.toml", "[[step]]\nduration_ms = 300\n");
    cli()
        .args(["simulate", "--quiet"])
        .arg(&scenario)
        .assert()
        .success()
        .stdout(predicate::str::contains("Transitions:").not());
}

#[test]
fn cli_simulate_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .arg("simulate")
        .arg(dir.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn cli_simulate_empty_scenario_fails() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = write_file(dir.path(), "scenario.toml", "device_type = \"GS06\"\n");
    cli()
        .arg("simulate")
        .arg(&scenario)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no steps"));
}

// ── run ──

#[test]
fn cli_run_for_one_second_prints_gps_events() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["--json", "run", "--duration", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"led\":\"gps\""));
}

#[test]
fn cli_run_json_ends_with_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["--json", "run", "--duration", "0"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    let last = stdout.lines().last().expect("run --json should print a snapshot");
    let json: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(json["uptime_ms"], 0);
    assert_eq!(json["gsm_mode"], "flash");
    assert_eq!(json["leds"].as_array().unwrap().len(), 3);
}

#[test]
fn cli_run_rejects_bad_mode() {
    cli()
        .args(["run", "--gsm-mode", "strobe", "--duration", "0"])
        .assert()
        .failure();
}
