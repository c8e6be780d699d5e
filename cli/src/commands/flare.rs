//! `flare` command: collect, sanitize, archive and upload agent diagnostics.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::archive_builder::{self, Collection, Sources};
use crate::application::services::upload::{self, UploadOptions};
use crate::domain::bundle::archive_file_name;
use crate::domain::upload::success_message;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::resolve_hostname;
use crate::infra::prompt::DialoguerPrompter;
use crate::infra::status::{SnapshotStatusReporter, YamlSyntaxValidator};
use crate::infra::transport::{ReqwestTransport, UPLOAD_TIMEOUT};
use crate::output::{TerminalReporter, progress};

/// Arguments for the flare command.
#[derive(Args, Debug, Default)]
pub struct FlareArgs {
    /// Existing support case id to attach the flare to
    pub case_id: Option<u64>,

    /// Email for a new support case (prompted for when omitted)
    #[arg(long)]
    pub email: Option<String>,

    /// Build the archive and print its path without uploading
    #[arg(long)]
    pub no_upload: bool,
}

/// Run the flare command.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, collection fails, or
/// the upload is refused, aborted or rejected.
pub async fn run(app: &AppContext, args: &FlareArgs) -> Result<()> {
    let config = app.config_store.load()?;
    let hostname = resolve_hostname(&config)?;
    let scratch = std::env::temp_dir();
    let archive = scratch.join(archive_file_name(&chrono::Local::now()));
    let reporter = TerminalReporter::new(&app.output);

    let runner = TokioCommandRunner::default();
    let status = SnapshotStatusReporter::new(config.status_dir.clone());
    let archive = archive_builder::collect(
        &Collection {
            config: &config,
            hostname: &hostname,
            archive: &archive,
            scratch_dir: &scratch,
        },
        &Sources {
            runner: &runner,
            validator: &YamlSyntaxValidator,
            status: &status,
        },
        &reporter,
    )
    .await?;

    if args.no_upload {
        app.output
            .info(&format!("Flare saved to {} (upload skipped)", archive.display()));
        return Ok(());
    }

    let case_id = args.case_id.map(|id| id.to_string());
    let opts = UploadOptions {
        dd_url: &config.dd_url,
        api_key: config.api_key.as_deref().unwrap_or_default(),
        hostname: &hostname,
        case_id: case_id.as_deref(),
        email: args.email.as_deref(),
        confirm: !app.non_interactive,
        non_interactive: app.non_interactive,
    };
    let request = upload::prepare(&archive, &opts, &DialoguerPrompter)?;

    let transport = ReqwestTransport::new(UPLOAD_TIMEOUT)?;
    let pb = progress::maybe_spinner(
        app.output.show_progress(),
        &format!("Uploading {} to Datadog Support", archive.display()),
    );
    let result = upload::send(&request, &config.dd_url, &transport).await;
    progress::finish_clear(&pb);

    let case_id = result?;
    app.output.success(&success_message(&case_id));
    Ok(())
}
