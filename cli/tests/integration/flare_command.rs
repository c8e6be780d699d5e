//! Integration tests for the default `flare` command.
//!
//! Every run points `TMPDIR` at a throwaway directory so archives and
//! sanitized copies never land in the real temp dir.

#![cfg(unix)]
#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

struct Install {
    dir: tempfile::TempDir,
}

impl Install {
    fn new(api_key: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        for sub in ["etc/conf.d", "log", "status", "tmp"] {
            std::fs::create_dir_all(root.join(sub)).expect("mkdir");
        }
        std::fs::write(
            root.join("etc/datadog.conf"),
            "api_key: 1234567890123456789012345abcde\n",
        )
        .expect("write");
        std::fs::write(root.join("etc/supervisor.conf"), "[supervisord]\n").expect("write");
        std::fs::write(root.join("etc/conf.d/redis.yaml"), "  password: s3cr3t\n").expect("write");
        std::fs::write(root.join("log/collector.log"), "started\n").expect("write");

        let mut config = format!(
            "hostname: it-host\nplatform: unix\nconfig_path: {etc}/datadog.conf\nconfd_path: {etc}/conf.d\nstatus_dir: {status}\nlogging:\n  collector_log_file: {log}/collector.log\n  forwarder_log_file: {log}/forwarder.log\n  dogstatsd_log_file: {log}/dogstatsd.log\n  jmxfetch_log_file: {log}/jmxfetch.log\n",
            etc = root.join("etc").display(),
            status = root.join("status").display(),
            log = root.join("log").display(),
        );
        if let Some(key) = api_key {
            config.push_str(&format!("api_key: {key}\n"));
        }
        std::fs::write(root.join("flare.yaml"), config).expect("write config");
        Self { dir }
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("flare.yaml")
    }

    fn tmp(&self) -> PathBuf {
        self.dir.path().join("tmp")
    }

    fn archives(&self) -> Vec<PathBuf> {
        archives_in(&self.tmp())
    }

    fn flare(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flare"));
        cmd.env("NO_COLOR", "1")
            .env("TMPDIR", self.tmp())
            .env_remove("DD_API_KEY")
            .env_remove("DD_URL")
            .env_remove("DD_FLARE_CONFIG")
            .arg("--config")
            .arg(self.config());
        cmd
    }
}

fn archives_in(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("read tmp")
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("datadog-agent-") && n.ends_with(".tar.bz2"))
        })
        .collect()
}

#[test]
fn test_missing_api_key_fails_without_archive() {
    let install = Install::new(None);
    install
        .flare()
        .arg("--no-upload")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: No API key configured"));
    assert!(install.archives().is_empty());
}

#[test]
fn test_api_key_from_environment_is_accepted() {
    let install = Install::new(None);
    install
        .flare()
        .env("DD_API_KEY", "from-env")
        .arg("--no-upload")
        .assert()
        .success();
    assert_eq!(install.archives().len(), 1);
}

#[test]
fn test_no_upload_builds_archive_and_prints_path() {
    let install = Install::new(Some("abc"));
    install
        .flare()
        .arg("--no-upload")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "redis.yaml - this file contains a password which has been removed",
        ))
        .stdout(predicate::str::contains("upload skipped"));

    let archives = install.archives();
    assert_eq!(archives.len(), 1);

    let file = std::fs::File::open(&archives[0]).expect("open");
    let mut archive = tar::Archive::new(bzip2::read::BzDecoder::new(file));
    let mut names = Vec::new();
    for entry in archive.entries().expect("entries") {
        let mut entry = entry.expect("entry");
        let name = entry.path().expect("path").display().to_string();
        let mut body = String::new();
        std::io::Read::read_to_string(&mut entry, &mut body).expect("read");
        assert!(!body.contains("s3cr3t"), "{name} leaks a password");
        assert!(
            !body.contains("1234567890123456789012345"),
            "{name} leaks the api key"
        );
        names.push(name);
    }
    assert!(names.contains(&"datadog-it-host/log/collector.log".to_string()));
    assert!(names.contains(&"datadog-it-host/etc/conf.d/redis.yaml".to_string()));
    assert!(names.contains(&"datadog-it-host/status.log".to_string()));
    assert!(names.contains(&"datadog-it-host/info.log".to_string()));
}

#[test]
fn test_non_interactive_new_case_requires_email() {
    let install = Install::new(Some("abc"));
    install
        .flare()
        .arg("--yes")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("An email address is required"));
    // The archive is kept for manual delivery.
    assert_eq!(install.archives().len(), 1);
}
