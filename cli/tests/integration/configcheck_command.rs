//! Integration tests for `flare configcheck`.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn flare() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flare"));
    cmd.env("NO_COLOR", "1")
        .env_remove("DD_API_KEY")
        .env_remove("DD_URL")
        .env_remove("DD_FLARE_CONFIG");
    cmd
}

/// Write a flare config whose `confd_path` points at `confd`.
fn config_for(dir: &Path, confd: &Path) -> PathBuf {
    let path = dir.join("flare.yaml");
    std::fs::write(&path, format!("confd_path: {}\n", confd.display())).expect("write config");
    path
}

#[test]
fn test_configcheck_all_valid_exits_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let confd = dir.path().join("conf.d");
    std::fs::create_dir(&confd).expect("mkdir");
    std::fs::write(confd.join("disk.yaml"), "init_config:\ninstances:\n  - use_mount: no\n")
        .expect("write");

    flare()
        .arg("configcheck")
        .arg("--config")
        .arg(config_for(dir.path(), &confd))
        .assert()
        .success()
        .stdout(predicate::str::contains("disk.yaml is valid"))
        .stdout(predicate::str::contains(
            "All yaml files passed. You can now run the Datadog agent.",
        ));
}

#[test]
fn test_configcheck_invalid_file_exits_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let confd = dir.path().join("conf.d");
    std::fs::create_dir(&confd).expect("mkdir");
    std::fs::write(confd.join("good.yaml"), "init_config:\n").expect("write");
    std::fs::write(confd.join("broken.yaml"), "instances: [host: x\n").expect("write");

    flare()
        .arg("configcheck")
        .arg("--config")
        .arg(config_for(dir.path(), &confd))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("broken.yaml contains errors:\n    "))
        .stdout(predicate::str::contains("good.yaml is valid"))
        .stdout(predicate::str::contains(
            "Fix the invalid yaml files above in order to start the Datadog agent.",
        ));
}

#[test]
fn test_configcheck_malformed_flare_config_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("flare.yaml");
    std::fs::write(&path, "confd_path: [unclosed\n").expect("write");

    flare()
        .arg("configcheck")
        .arg("--config")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: cannot parse"));
}
