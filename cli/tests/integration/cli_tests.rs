//! Integration tests for argument parsing, help and version output.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn flare() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flare"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_help_flag_shows_help() {
    flare()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("configcheck"))
        .stdout(predicate::str::contains("--no-upload"))
        .stdout(predicate::str::contains("[CASE_ID]"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    flare()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flare"));
}

#[test]
fn test_version_command_shows_version() {
    flare()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_non_numeric_case_id_is_rejected() {
    flare()
        .arg("not-a-number")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    flare()
        .arg("--definitely-not-a-flag")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unexpected argument"));
}
