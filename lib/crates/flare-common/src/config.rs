use serde::Deserialize;
use std::path::PathBuf;

/// Operating-system family the agent is installed on.
///
/// Drives default paths and the platform-specific parts of a flare
/// (supervisor config, status commands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    /// Platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    #[must_use]
    pub fn is_windows(self) -> bool {
        self == Self::Windows
    }
}

/// Agent configuration consumed by the flare pipeline.
///
/// Every path has a platform default so an empty (or missing) file still
/// yields a usable configuration. Only `api_key` has no default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Datadog API key. Required before any collection starts.
    pub api_key: Option<String>,

    /// Base intake URL, e.g. `https://app.datadoghq.com`.
    pub dd_url: String,

    /// Hostname override; the system hostname is used when absent.
    pub hostname: Option<String>,

    /// Platform override (defaults to the compile target).
    pub platform: Platform,

    /// Main agent configuration file (`datadog.conf`).
    pub config_path: PathBuf,

    /// Directory holding per-check `*.yaml` configuration.
    pub confd_path: PathBuf,

    /// Directory where agent components leave their latest status report.
    pub status_dir: PathBuf,

    /// Log file locations.
    pub logging: LoggingConfig,
}

/// Log file locations for the agent components. Keys left out of a
/// `logging:` section keep their platform default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub collector_log_file: PathBuf,
    pub forwarder_log_file: PathBuf,
    pub dogstatsd_log_file: PathBuf,
    pub jmxfetch_log_file: PathBuf,
}

pub const DEFAULT_DD_URL: &str = "https://app.datadoghq.com";

impl AgentConfig {
    /// Defaults for a given platform.
    #[must_use]
    pub fn defaults_for(platform: Platform) -> Self {
        let (etc, logs) = platform_dirs(platform);
        Self {
            api_key: None,
            dd_url: DEFAULT_DD_URL.to_string(),
            hostname: None,
            platform,
            config_path: etc.join("datadog.conf"),
            confd_path: etc.join("conf.d"),
            status_dir: std::env::temp_dir(),
            logging: LoggingConfig::under(&logs),
        }
    }

    /// `supervisor.conf` lives next to the main configuration file.
    #[must_use]
    pub fn supervisor_config_path(&self) -> PathBuf {
        self.config_path
            .parent()
            .map_or_else(|| PathBuf::from("supervisor.conf"), |d| d.join("supervisor.conf"))
    }
}

/// Configuration and log directories of a stock installation.
fn platform_dirs(platform: Platform) -> (PathBuf, PathBuf) {
    match platform {
        Platform::Unix => (
            PathBuf::from("/etc/dd-agent"),
            PathBuf::from("/var/log/datadog"),
        ),
        Platform::Windows => (
            PathBuf::from(r"C:\ProgramData\Datadog"),
            PathBuf::from(r"C:\ProgramData\Datadog\logs"),
        ),
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::defaults_for(Platform::current())
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::under(&platform_dirs(Platform::current()).1)
    }
}

impl LoggingConfig {
    /// Standard component log names inside `dir`.
    #[must_use]
    pub fn under(dir: &std::path::Path) -> Self {
        Self {
            collector_log_file: dir.join("collector.log"),
            forwarder_log_file: dir.join("forwarder.log"),
            dogstatsd_log_file: dir.join("dogstatsd.log"),
            jmxfetch_log_file: dir.join("jmxfetch.log"),
        }
    }
}
