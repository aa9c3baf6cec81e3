//! Smoke tests for the rmap CLI.
//!
//! These tests verify basic CLI functionality:
//! - `rmap --version` outputs version info
//! - `rmap --help` outputs help text
//! - errors are reported on stderr with exit code 1

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

/// Get a Command for the rmap binary.
fn rmap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rmap"))
}

#[test]
fn test_version_flag() {
    rmap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rmap"))
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    rmap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("matrix"));
}

#[test]
fn test_no_args_shows_usage() {
    rmap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_empty_store_stats() {
    let env = TestEnv::new();
    env.rmap()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\":0"));
}

#[test]
fn test_error_is_json_on_stderr() {
    let env = TestEnv::new();
    env.rmap()
        .args(["feature", "show", "ft-0000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("{\"error\":"))
        .stderr(predicate::str::contains("ft-0000"));
}

#[test]
fn test_error_is_plain_with_human_flag() {
    let env = TestEnv::new();
    env.rmap()
        .args(["feature", "show", "ft-0000", "-H"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let env = TestEnv::new();
    env.rmap()
        .args(["-v", "feature", "add", "--name", "Search"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"action\":\"added\""))
        .stderr(predicate::str::contains("added feature"));
}
