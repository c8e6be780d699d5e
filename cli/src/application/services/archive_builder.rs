//! Application service: assemble the flare archive.
//!
//! Collection order is fixed (logs, main config, supervisor config, check
//! configs, then the three captured diagnostics) so identical inputs produce
//! identical entry names in identical order.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bzip2::Compression;
use bzip2::write::BzEncoder;
use flare_common::AgentConfig;

use crate::application::ports::{CommandRunner, ConfigValidator, ProgressReporter, StatusReporter};
use crate::application::services::capture::{
    ComponentInfo, ConfigCheck, Diagnostic, SupervisorStatus, capture,
};
use crate::application::services::configcheck::yaml_files;
use crate::application::services::redactor::sanitize;
use crate::domain::bundle::{BundleLayout, rotated_log_pattern, supervisor_log_pattern};
use crate::domain::error::FlareError;
use crate::domain::redact::RedactionMode;

// ── Archive writer ────────────────────────────────────────────────────────────

/// Write-once bzip2-compressed tar archive.
///
/// Destinations are unique: a second entry for the same path is skipped.
/// [`ArchiveWriter::finish`] consumes the writer, so an archive is closed
/// exactly once and never appended to afterwards.
pub struct ArchiveWriter {
    path: PathBuf,
    builder: tar::Builder<BzEncoder<File>>,
    seen: HashSet<PathBuf>,
}

impl ArchiveWriter {
    /// Create the archive at `path`, replacing any file already there.
    ///
    /// # Errors
    ///
    /// Returns an error if a stale archive cannot be removed or the file
    /// cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "removing stale archive");
            std::fs::remove_file(path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut builder = tar::Builder::new(BzEncoder::new(file, Compression::best()));
        builder.follow_symlinks(true);
        Ok(Self {
            path: path.to_path_buf(),
            builder,
            seen: HashSet::new(),
        })
    }

    /// Archive path on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add the file at `source` under `dest`. Returns `false` when `dest`
    /// was already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` cannot be read or the archive cannot be written.
    pub fn append_file(&mut self, source: &Path, dest: &Path) -> Result<bool> {
        if !self.claim(dest) {
            return Ok(false);
        }
        self.builder
            .append_path_with_name(source, dest)
            .with_context(|| format!("failed to archive {}", source.display()))?;
        tracing::debug!(source = %source.display(), dest = %dest.display(), "archived file");
        Ok(true)
    }

    /// Add in-memory `data` under `dest`. Returns `false` when `dest` was
    /// already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be written.
    pub fn append_bytes(&mut self, dest: &Path, data: &[u8]) -> Result<bool> {
        if !self.claim(dest) {
            return Ok(false);
        }
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default());
        self.builder
            .append_data(&mut header, dest, data)
            .with_context(|| format!("failed to archive {}", dest.display()))?;
        tracing::debug!(dest = %dest.display(), bytes = data.len(), "archived capture");
        Ok(true)
    }

    /// Write the tar trailer, flush the compressor and close the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the final blocks cannot be written.
    pub fn finish(self) -> Result<PathBuf> {
        let encoder = self
            .builder
            .into_inner()
            .with_context(|| format!("failed to finalize {}", self.path.display()))?;
        let file = encoder
            .finish()
            .with_context(|| format!("failed to compress {}", self.path.display()))?;
        file.sync_all()
            .with_context(|| format!("failed to sync {}", self.path.display()))?;
        Ok(self.path)
    }

    fn claim(&mut self, dest: &Path) -> bool {
        if self.seen.insert(dest.to_path_buf()) {
            true
        } else {
            tracing::debug!(dest = %dest.display(), "duplicate archive entry skipped");
            false
        }
    }
}

// ── Collection ────────────────────────────────────────────────────────────────

/// External collaborators queried while collecting.
pub struct Sources<'a, R, V, S> {
    pub runner: &'a R,
    pub validator: &'a V,
    pub status: &'a S,
}

/// One flare collection: what to read and where to write.
pub struct Collection<'a> {
    pub config: &'a AgentConfig,
    pub hostname: &'a str,
    /// Final archive path.
    pub archive: &'a Path,
    /// Directory for sanitized temporary copies.
    pub scratch_dir: &'a Path,
}

/// Build the archive described by `job`.
///
/// # Errors
///
/// Returns [`FlareError::MissingApiKey`] before touching the filesystem when
/// no API key is configured. Any unreadable source aborts collection; the
/// partially written archive is left on disk and must not be used.
pub async fn collect<R, V, S>(
    job: &Collection<'_>,
    sources: &Sources<'_, R, V, S>,
    reporter: &impl ProgressReporter,
) -> Result<PathBuf>
where
    R: CommandRunner,
    V: ConfigValidator,
    S: StatusReporter,
{
    if job.config.api_key.as_deref().is_none_or(str::is_empty) {
        return Err(FlareError::MissingApiKey.into());
    }

    let layout = BundleLayout::new(job.hostname);
    let mut writer = ArchiveWriter::create(job.archive)?;

    tracing::info!(archive = %job.archive.display(), "collecting logs and configuration files");
    reporter.step("Collecting logs and configuration files:");

    add_logs(&mut writer, &layout, job.config, reporter)?;
    add_configs(&mut writer, &layout, job, reporter)?;

    reporter.step("* datadog-agent configcheck output");
    add_capture(
        &mut writer,
        &layout,
        &ConfigCheck::new(sources.validator, &job.config.confd_path),
    )
    .await?;

    reporter.step("* datadog-agent status output");
    add_capture(
        &mut writer,
        &layout,
        &SupervisorStatus::new(
            sources.runner,
            job.config.platform,
            job.config.supervisor_config_path(),
        ),
    )
    .await?;

    reporter.step("* datadog-agent info output");
    add_capture(&mut writer, &layout, &ComponentInfo::new(sources.status)).await?;

    reporter.step(&format!("Saving all files to {}", job.archive.display()));
    writer.finish()
}

fn add_logs(
    writer: &mut ArchiveWriter,
    layout: &BundleLayout,
    config: &AgentConfig,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let logging = &config.logging;
    let patterns = [
        rotated_log_pattern(&logging.collector_log_file),
        rotated_log_pattern(&logging.forwarder_log_file),
        rotated_log_pattern(&logging.dogstatsd_log_file),
        rotated_log_pattern(&logging.jmxfetch_log_file),
        supervisor_log_pattern(&logging.collector_log_file),
    ];
    for pattern in &patterns {
        for log in sorted_matches(pattern)? {
            let dest = layout.log(&log);
            if writer.append_file(&log, &dest)? {
                reporter.step(&format!("* {}", log.display()));
            } else {
                reporter.warn(&format!(
                    "{} skipped, {} is already in the archive",
                    log.display(),
                    dest.display()
                ));
            }
        }
    }
    Ok(())
}

fn add_configs(
    writer: &mut ArchiveWriter,
    layout: &BundleLayout,
    job: &Collection<'_>,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let config = job.config;

    let main = sanitize(&config.config_path, RedactionMode::ApiKey, job.scratch_dir)?;
    writer.append_file(main.path(), &layout.main_config())?;
    reporter.step(&format!("* {}", config.config_path.display()));
    drop(main);

    if !config.platform.is_windows() {
        let supervisor = config.supervisor_config_path();
        writer.append_file(&supervisor, &layout.supervisor_config())?;
        reporter.step(&format!("* {}", supervisor.display()));
    }

    for check in yaml_files(&config.confd_path)? {
        let clean = sanitize(&check, RedactionMode::Password, job.scratch_dir)?;
        writer.append_file(clean.path(), &layout.check_config(&check))?;
        reporter.step(&format!("* {}{}", check.display(), clean.notice()));
    }
    Ok(())
}

async fn add_capture(
    writer: &mut ArchiveWriter,
    layout: &BundleLayout,
    diagnostic: &impl Diagnostic,
) -> Result<()> {
    let data = capture(diagnostic)
        .await
        .with_context(|| format!("failed to capture {}", diagnostic.name()))?;
    writer.append_bytes(&layout.capture(diagnostic.name()), &data)?;
    Ok(())
}

fn sorted_matches(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)
        .with_context(|| format!("invalid glob pattern {pattern}"))?
        .filter_map(std::result::Result::ok)
        .collect();
    paths.sort();
    if paths.is_empty() {
        tracing::debug!(pattern, "no files matched");
    }
    Ok(paths)
}
