//! Archive layout: where every collected file lands inside a flare.
//!
//! Pure functions only. Downstream support tooling depends on these exact
//! paths, so they are pinned by tests.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

/// Archive file name; `{}` is replaced by the creation timestamp.
pub const ARCHIVE_NAME_TEMPLATE: &str = "datadog-agent-{}.tar.bz2";

/// `strftime` format of the archive timestamp.
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

pub const CONFIGCHECK_LOG: &str = "configcheck.log";
pub const STATUS_LOG: &str = "status.log";
pub const INFO_LOG: &str = "info.log";

/// Archive file name for a flare created at `at`.
#[must_use]
pub fn archive_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ARCHIVE_NAME_TEMPLATE.replace("{}", &at.format(ARCHIVE_TIMESTAMP_FORMAT).to_string())
}

/// Destination paths inside one flare, all rooted at `datadog-<hostname>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    root: PathBuf,
}

impl BundleLayout {
    #[must_use]
    pub fn new(hostname: &str) -> Self {
        Self {
            root: PathBuf::from(format!("datadog-{hostname}")),
        }
    }

    /// `datadog-<hostname>`
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `log/<basename>` for any collected log file.
    #[must_use]
    pub fn log(&self, source: &Path) -> PathBuf {
        self.root.join("log").join(basename(source))
    }

    /// `etc/datadog.conf`
    #[must_use]
    pub fn main_config(&self) -> PathBuf {
        self.root.join("etc").join("datadog.conf")
    }

    /// `etc/supervisor.conf`
    #[must_use]
    pub fn supervisor_config(&self) -> PathBuf {
        self.root.join("etc").join("supervisor.conf")
    }

    /// `etc/conf.d/<basename>`
    #[must_use]
    pub fn check_config(&self, source: &Path) -> PathBuf {
        self.root.join("etc").join("conf.d").join(basename(source))
    }

    /// Root-level captured diagnostic, e.g. `status.log`.
    #[must_use]
    pub fn capture(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

fn basename(path: &Path) -> &std::ffi::OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

/// Glob matching a log file and its rotations (`collector.log`, `collector.log.1`, ...).
#[must_use]
pub fn rotated_log_pattern(log_file: &Path) -> String {
    format!("{}*", log_file.display())
}

/// Glob matching supervisor logs kept next to the collector log.
#[must_use]
pub fn supervisor_log_pattern(collector_log: &Path) -> String {
    let dir = collector_log.parent().unwrap_or_else(|| Path::new("."));
    format!("{}/*supervisord.log*", dir.display())
}
