//! Infrastructure implementations of the diagnostic source ports: status
//! snapshots on disk and YAML syntax validation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flare_common::Component;

use crate::application::ports::{ConfigValidator, StatusReporter};

/// Reads the status snapshot each agent component leaves in `status_dir`
/// as `<component>.status`.
pub struct SnapshotStatusReporter {
    status_dir: PathBuf,
}

impl SnapshotStatusReporter {
    #[must_use]
    pub fn new(status_dir: PathBuf) -> Self {
        Self { status_dir }
    }

    fn snapshot_path(&self, component: Component) -> PathBuf {
        self.status_dir.join(format!("{}.status", component.name()))
    }
}

impl StatusReporter for SnapshotStatusReporter {
    fn latest_status(&self, component: Component, verbose: bool) -> Result<String> {
        let path = self.snapshot_path(component);
        if !path.exists() {
            return Ok(format!("{} is not running\n", component.title()));
        }
        let body = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let title = component.title();
        let rule = "=".repeat(title.len());
        let body = if verbose {
            body
        } else {
            body.lines()
                .find(|l| !l.trim().is_empty())
                .unwrap_or_default()
                .to_string()
        };
        Ok(format!("{title}\n{rule}\n\n{}\n", body.trim_end()))
    }
}

/// Syntax-only YAML check via `serde_yaml`.
pub struct YamlSyntaxValidator;

impl ConfigValidator for YamlSyntaxValidator {
    fn check(&self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str::<serde_yaml::Value>(&content)?;
        Ok(())
    }
}
