//! Application service: YAML syntax check of every `conf.d/*.yaml` file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ConfigValidator;

/// Printed after the per-file lines when every file parsed.
pub const ALL_VALID: &str = "All yaml files passed. You can now run the Datadog agent.";

/// Printed after the per-file lines when at least one file failed.
pub const SOME_INVALID: &str = "Fix the invalid yaml files above in order to start the Datadog agent. \
     A useful external tool for yaml parsing can be found at \
     http://yaml-online-parser.appspot.com/";

/// Verdict for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    pub path: PathBuf,
    /// `None` when the file parsed.
    pub error: Option<String>,
}

impl FileCheck {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// `<basename> is valid` or `<basename> contains errors:\n    <error>`.
    #[must_use]
    pub fn line(&self) -> String {
        let name = self
            .path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned());
        match &self.error {
            None => format!("{name} is valid"),
            Some(e) => format!("{name} contains errors:\n    {e}"),
        }
    }
}

/// Outcome of checking a whole `conf.d` directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigCheckReport {
    pub files: Vec<FileCheck>,
}

impl ConfigCheckReport {
    #[must_use]
    pub fn all_valid(&self) -> bool {
        self.files.iter().all(FileCheck::is_valid)
    }

    #[must_use]
    pub fn summary(&self) -> &'static str {
        if self.all_valid() { ALL_VALID } else { SOME_INVALID }
    }

    /// Full text: one line per file, then the summary.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for file in &self.files {
            out.push_str(&file.line());
            out.push('\n');
        }
        out.push_str(self.summary());
        out.push('\n');
        out
    }
}

/// Sorted `<confd>/*.yaml` paths. A missing directory yields no files.
///
/// # Errors
///
/// Returns an error if the directory path cannot form a valid glob.
pub fn yaml_files(confd: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.yaml", confd.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("invalid glob pattern {pattern}"))?
        .filter_map(std::result::Result::ok)
        .collect();
    files.sort();
    Ok(files)
}

/// Validate every check configuration under `confd`.
///
/// # Errors
///
/// Returns an error only if `confd` cannot be listed; per-file failures are
/// part of the report.
pub fn check_confd(validator: &impl ConfigValidator, confd: &Path) -> Result<ConfigCheckReport> {
    let files = yaml_files(confd)?
        .into_iter()
        .map(|path| {
            let error = validator.check(&path).err().map(|e| format!("{e:#}"));
            if let Some(e) = &error {
                tracing::warn!(path = %path.display(), error = %e, "invalid yaml");
            }
            FileCheck { path, error }
        })
        .collect();
    Ok(ConfigCheckReport { files })
}
