//! Application service: diagnostic routines captured into an in-memory sink.
//!
//! Each [`Diagnostic`] writes plain text to the `Vec<u8>` it is handed. The
//! archive builder turns a successful capture into a root-level entry; a
//! failed routine drops its sink, so partial output never reaches the archive.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Result;
use flare_common::{Component, Platform};

use crate::application::ports::{CommandRunner, ConfigValidator, StatusReporter};
use crate::application::services::configcheck::check_confd;
use crate::domain::bundle::{CONFIGCHECK_LOG, INFO_LOG, STATUS_LOG};

/// Service-manager script queried for the agent status.
pub const INIT_SCRIPT: &str = "/etc/init.d/datadog-agent";

/// Supervisor control binary shipped with the agent.
pub const SUPERVISORCTL: &str = "/opt/datadog-agent/bin/supervisorctl";

/// Written instead of running anything on Windows.
pub const WINDOWS_STATUS: &str = "Windows - status not implemented";

/// A routine whose text output becomes one archive entry.
#[allow(async_fn_in_trait)]
pub trait Diagnostic {
    /// Entry name at the bundle root.
    fn name(&self) -> &'static str;

    /// Write the diagnostic text into `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the routine itself fails; callers discard `sink`.
    async fn run(&self, sink: &mut Vec<u8>) -> Result<()>;
}

/// Run `diagnostic` against a fresh sink and return what it wrote.
///
/// # Errors
///
/// Propagates the routine's error; the partial capture is dropped.
pub async fn capture(diagnostic: &impl Diagnostic) -> Result<Vec<u8>> {
    let mut sink = Vec::new();
    diagnostic.run(&mut sink).await?;
    tracing::debug!(name = diagnostic.name(), bytes = sink.len(), "captured diagnostic");
    Ok(sink)
}

// ── configcheck.log ───────────────────────────────────────────────────────────

/// YAML validity of every check configuration.
pub struct ConfigCheck<'a, V: ConfigValidator> {
    validator: &'a V,
    confd: &'a Path,
}

impl<'a, V: ConfigValidator> ConfigCheck<'a, V> {
    #[must_use]
    pub fn new(validator: &'a V, confd: &'a Path) -> Self {
        Self { validator, confd }
    }
}

impl<V: ConfigValidator> Diagnostic for ConfigCheck<'_, V> {
    fn name(&self) -> &'static str {
        CONFIGCHECK_LOG
    }

    async fn run(&self, sink: &mut Vec<u8>) -> Result<()> {
        let report = check_confd(self.validator, self.confd)?;
        sink.write_all(report.render().as_bytes())?;
        Ok(())
    }
}

// ── status.log ────────────────────────────────────────────────────────────────

/// Service and supervisor status. Command failures are written as text and
/// never abort the capture.
pub struct SupervisorStatus<'a, R: CommandRunner> {
    runner: &'a R,
    platform: Platform,
    supervisor_conf: PathBuf,
}

impl<'a, R: CommandRunner> SupervisorStatus<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R, platform: Platform, supervisor_conf: PathBuf) -> Self {
        Self {
            runner,
            platform,
            supervisor_conf,
        }
    }

    async fn write_command(
        &self,
        sink: &mut Vec<u8>,
        heading: &str,
        program: &str,
        args: &[&str],
    ) -> Result<()> {
        writeln!(sink, "{heading}")?;
        let text = match self.runner.run_merged(program, args).await {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
            Ok(output) => {
                let code = output
                    .status
                    .code()
                    .map_or_else(|| "unknown".to_string(), |c| c.to_string());
                tracing::warn!(program, code = %code, "status command failed");
                format!(
                    "Not able to get output, exit number {code}, exit output:\n{}",
                    String::from_utf8_lossy(&output.stdout)
                )
            }
            Err(e) => {
                tracing::warn!(program, error = %e, "status command did not run");
                format!("Not able to get output, {e:#}")
            }
        };
        writeln!(sink, "{text}")?;
        Ok(())
    }
}

impl<R: CommandRunner> Diagnostic for SupervisorStatus<'_, R> {
    fn name(&self) -> &'static str {
        STATUS_LOG
    }

    async fn run(&self, sink: &mut Vec<u8>) -> Result<()> {
        if self.platform.is_windows() {
            writeln!(sink, "{WINDOWS_STATUS}")?;
            return Ok(());
        }

        self.write_command(
            sink,
            &format!("{INIT_SCRIPT} status"),
            INIT_SCRIPT,
            &["status"],
        )
        .await?;

        let conf = self.supervisor_conf.to_string_lossy();
        self.write_command(
            sink,
            "supervisorctl status",
            SUPERVISORCTL,
            &["-c", &conf, "status"],
        )
        .await
    }
}

// ── info.log ──────────────────────────────────────────────────────────────────

/// Latest verbose status of every agent component.
pub struct ComponentInfo<'a, S: StatusReporter> {
    reporter: &'a S,
}

impl<'a, S: StatusReporter> ComponentInfo<'a, S> {
    #[must_use]
    pub fn new(reporter: &'a S) -> Self {
        Self { reporter }
    }
}

impl<S: StatusReporter> Diagnostic for ComponentInfo<'_, S> {
    fn name(&self) -> &'static str {
        INFO_LOG
    }

    async fn run(&self, sink: &mut Vec<u8>) -> Result<()> {
        for component in Component::ALL {
            let status = self.reporter.latest_status(component, true)?;
            sink.write_all(status.as_bytes())?;
            if !status.ends_with('\n') {
                sink.push(b'\n');
            }
        }
        Ok(())
    }
}
