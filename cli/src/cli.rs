//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Collect agent logs and configuration, strip secrets, and send them to support
#[derive(Parser)]
#[command(name = "flare", version, propagate_version = true)]
pub struct Cli {
    /// Agent configuration file [default: $DD_FLARE_CONFIG or the platform path]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(flatten)]
    pub flare: commands::flare::FlareArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check every conf.d/*.yaml file for YAML syntax errors
    Configcheck,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            config,
            yes,
            quiet,
            verbose: _,
            no_color,
            flare,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            output: OutputFlags { no_color, quiet },
            yes,
            config,
        });
        match command {
            None => commands::flare::run(&app, &flare)
                .await
                .map(|()| ExitCode::SUCCESS),
            Some(Command::Configcheck) => commands::configcheck::run(&app),
            Some(Command::Version) => {
                commands::version::run();
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
