//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use flare_common::{AgentConfig, Platform};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV: &str = "DD_FLARE_CONFIG";
pub const API_KEY_ENV: &str = "DD_API_KEY";
pub const DD_URL_ENV: &str = "DD_URL";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
///
/// Lookup order: explicit path (`--config`), `$DD_FLARE_CONFIG`, platform
/// default. A missing file yields platform defaults; `DD_API_KEY` and
/// `DD_URL` override whatever the file says.
#[derive(Debug, Clone, Default)]
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<AgentConfig> {
        let path = self.path();
        let config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            parse(&content).with_context(|| format!("cannot parse {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "no flare config, using defaults");
            AgentConfig::default()
        };
        Ok(apply_env(config, |key| std::env::var(key).ok()))
    }

    fn path(&self) -> PathBuf {
        if let Some(path) = &self.explicit {
            return path.clone();
        }
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(val);
        }
        default_path(Platform::current())
    }
}

/// Platform default location of the flare configuration.
#[must_use]
pub fn default_path(platform: Platform) -> PathBuf {
    match platform {
        Platform::Unix => PathBuf::from("/etc/dd-agent/flare.yaml"),
        Platform::Windows => PathBuf::from(r"C:\ProgramData\Datadog\flare.yaml"),
    }
}

/// Parse a configuration document; an empty document means defaults.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or has wrongly typed keys.
pub fn parse(content: &str) -> Result<AgentConfig> {
    if content.trim().is_empty() {
        return Ok(AgentConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Overlay non-empty environment values on `config`.
#[must_use]
pub fn apply_env(mut config: AgentConfig, var: impl Fn(&str) -> Option<String>) -> AgentConfig {
    let set = |key: &str| var(key).filter(|v| !v.trim().is_empty());
    if let Some(key) = set(API_KEY_ENV) {
        config.api_key = Some(key);
    }
    if let Some(url) = set(DD_URL_ENV) {
        config.dd_url = url;
    }
    config
}

/// Hostname the flare is filed under: the configured override, else the
/// system hostname.
///
/// # Errors
///
/// Returns an error if no override is set and the system hostname cannot be read.
pub fn resolve_hostname(config: &AgentConfig) -> Result<String> {
    if let Some(name) = config.hostname.as_deref().filter(|h| !h.is_empty()) {
        return Ok(name.to_string());
    }
    let name = hostname::get().context("cannot determine system hostname")?;
    Ok(name.to_string_lossy().into_owned())
}
