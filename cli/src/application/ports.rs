//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `flare_common`, never from
//! `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;
use flare_common::{AgentConfig, Component, FlareForm};

// ── Configuration Port ────────────────────────────────────────────────────────

/// Loads the agent configuration the flare is built from.
pub trait ConfigStore {
    /// Resolve, read and merge the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing configuration file cannot be read or parsed.
    fn load(&self) -> Result<AgentConfig>;

    /// Path the configuration is read from.
    fn path(&self) -> PathBuf;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with stderr folded into stdout. The returned `stderr`
    /// is empty.
    ///
    /// Implementations that can share one pipe between both streams keep
    /// the order in which the child wrote them; this fallback appends
    /// stderr after stdout.
    ///
    /// # Errors
    ///
    /// Same as [`CommandRunner::run`].
    async fn run_merged(&self, program: &str, args: &[&str]) -> Result<Output> {
        let mut output = self.run(program, args).await?;
        let stderr = std::mem::take(&mut output.stderr);
        output.stdout.extend_from_slice(&stderr);
        Ok(output)
    }
}

// ── Diagnostic Source Ports ───────────────────────────────────────────────────

/// Pass/fail YAML syntax check for one file.
pub trait ConfigValidator {
    /// # Errors
    ///
    /// Returns the read or parse failure; its message is shown to the operator.
    fn check(&self, path: &Path) -> Result<()>;
}

/// Last status report written by a running agent component.
pub trait StatusReporter {
    /// Render the latest status of `component` as plain text.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing status snapshot cannot be read.
    fn latest_status(&self, component: Component, verbose: bool) -> Result<String>;
}

// ── Upload Ports ──────────────────────────────────────────────────────────────

/// Raw HTTP reply of the support endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Sends the archive to the support endpoint.
#[allow(async_fn_in_trait)]
pub trait SupportTransport {
    /// One multipart POST of `archive` plus `form` to `url`. No retries.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport failure; any HTTP status is an `Ok`.
    async fn post_flare(&self, url: &str, form: &FlareForm, archive: &Path) -> Result<HttpReply>;
}

/// Operator interaction during the upload handshake.
pub trait Prompter {
    /// Yes/no question; an empty answer selects `default`.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Free-text question.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    fn input(&self, prompt: &str) -> Result<String>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
