//! Smoke tests for the taskboard CLI.
//!
//! These tests verify basic CLI functionality:
//! - `tb --version` outputs version info
//! - `tb --help` outputs help text
//! - errors are reported as JSON on stderr with exit code 1

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

/// Get a Command for the tb binary without any environment.
fn tb() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tb"));
    cmd.env_remove("TB_SNAPSHOT");
    cmd
}

#[test]
fn test_version_flag() {
    tb().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tb"))
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    tb().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_missing_snapshot_is_json_error() {
    let env = TestEnv::new();
    tb().current_dir(env.path())
        .arg("--config")
        .arg(env.config_path())
        .arg("report")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("--snapshot"));
}

#[test]
fn test_nonexistent_snapshot_human_error() {
    let env = TestEnv::new();
    tb().current_dir(env.path())
        .arg("--config")
        .arg(env.config_path())
        .args(["report", "-H", "--snapshot", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "))
        .stderr(predicate::str::contains("Snapshot file not found"));
}

#[test]
fn test_malformed_snapshot_fails() {
    let env = TestEnv::new();
    std::fs::write(env.snapshot_path(), "{ not json").unwrap();
    env.tb().arg("stats").assert().failure().code(1);
}

#[test]
fn test_bad_now_is_rejected() {
    let env = TestEnv::new();
    env.tb()
        .env("TB_NOW", "yesterday-ish")
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --now"));
}

#[test]
fn test_empty_snapshot_report() {
    let env = TestEnv::new();
    env.tb()
        .args(["report", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects found."));
}
