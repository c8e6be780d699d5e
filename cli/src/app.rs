//! Application context: unified state passed to every command handler.
//!
//! Built once in `Cli::run()` from the global flags and the environment.

use std::path::PathBuf;

use crate::infra::config::YamlConfigStore;
use crate::output::OutputContext;

/// Environment variable that forces non-interactive mode.
pub const YES_ENV: &str = "DD_FLARE_YES";

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    /// Skip interactive prompts (also set by `CI` / `DD_FLARE_YES` env vars).
    pub yes: bool,
    /// Explicit configuration file (`--config`).
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Agent configuration source.
    pub config_store: YamlConfigStore,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `DD_FLARE_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var(YES_ENV).is_ok();
        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config_store: YamlConfigStore::new(flags.config),
            non_interactive: flags.yes || ci_env,
        }
    }
}
