//! `flare configcheck`: YAML syntax check of every check configuration.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::{ConfigStore, ConfigValidator};
use crate::application::services::configcheck::check_confd;
use crate::infra::status::YamlSyntaxValidator;

/// Run the configcheck command. Exit code 0 when every file parses, 1 otherwise.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or `conf.d` cannot be listed.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.config_store.load()?;
    run_with(&YamlSyntaxValidator, &config.confd_path)
}

/// Validate `confd` with `validator` and print the report to stdout.
///
/// # Errors
///
/// Returns an error if `confd` cannot be listed.
pub fn run_with(validator: &impl ConfigValidator, confd: &std::path::Path) -> Result<ExitCode> {
    let report = check_confd(validator, confd)?;
    print!("{}", report.render());
    Ok(if report.all_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
