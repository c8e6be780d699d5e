//! Application service: size gate, confirmation handshake and the single
//! upload of a finished archive.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{Prompter, SupportTransport};
use crate::domain::error::FlareError;
use crate::domain::upload::{UploadOutcome, UploadRequest, check_size, support_url};

/// The prompt widget appends its own `[Y/n]` hint.
pub const CONFIRM_PROMPT: &str = "Do you want to continue";
pub const EMAIL_PROMPT: &str = "Please enter your email";

/// Who the flare is for and how the operator is asked about it.
#[derive(Debug, Clone)]
pub struct UploadOptions<'a> {
    pub dd_url: &'a str,
    pub api_key: &'a str,
    pub hostname: &'a str,
    pub case_id: Option<&'a str>,
    /// Email given up front; prompted for otherwise.
    pub email: Option<&'a str>,
    /// Ask before sending.
    pub confirm: bool,
    /// No prompts may be shown; a missing email is an error.
    pub non_interactive: bool,
}

/// Upload `archive` and return the support case id.
///
/// Steps: size gate, optional confirmation, email, one POST, classification.
/// Nothing touches the network before the size gate and the confirmation
/// have passed.
///
/// # Errors
///
/// See [`prepare`] and [`send`]. There are no retries.
pub async fn upload(
    archive: &Path,
    opts: &UploadOptions<'_>,
    prompter: &impl Prompter,
    transport: &impl SupportTransport,
) -> Result<String> {
    let request = prepare(archive, opts, prompter)?;
    send(&request, opts.dd_url, transport).await
}

/// Run the local half of the handshake: size gate, confirmation, email.
///
/// # Errors
///
/// Returns [`FlareError::SizeLimitExceeded`], [`FlareError::UserAborted`] or
/// [`FlareError::EmailRequired`]; the archive is left on disk in every case.
pub fn prepare(
    archive: &Path,
    opts: &UploadOptions<'_>,
    prompter: &impl Prompter,
) -> Result<UploadRequest> {
    let size = std::fs::metadata(archive)
        .with_context(|| format!("failed to stat {}", archive.display()))?
        .len();
    check_size(archive, size)?;

    if opts.confirm {
        if !prompter.confirm(&confirm_prompt(archive), true)? {
            return Err(FlareError::UserAborted {
                path: archive.to_path_buf(),
            }
            .into());
        }
    }

    let email = match (opts.case_id, opts.email) {
        (Some(_), _) => None,
        (None, Some(email)) => Some(email.to_string()),
        (None, None) if opts.non_interactive => None,
        (None, None) => Some(prompter.input(EMAIL_PROMPT)?),
    };

    let request = UploadRequest::new(
        archive.to_path_buf(),
        opts.api_key.to_string(),
        opts.hostname.to_string(),
        opts.case_id.map(str::to_string),
        email,
    )?;
    tracing::debug!(archive = %archive.display(), size, "upload request ready");
    Ok(request)
}

/// Confirmation question naming the archive, shown even in quiet mode.
#[must_use]
pub fn confirm_prompt(archive: &Path) -> String {
    format!(
        "{} is going to be uploaded to Datadog. {CONFIRM_PROMPT}",
        archive.display()
    )
}

/// POST the prepared request once and classify the reply.
///
/// # Errors
///
/// Returns the classified failure (client, server or unknown) as a
/// [`FlareError`]; transport errors propagate with context.
pub async fn send(
    request: &UploadRequest,
    dd_url: &str,
    transport: &impl SupportTransport,
) -> Result<String> {
    let url = support_url(dd_url, request.case_id.as_deref());
    tracing::info!(url = %url, archive = %request.archive.display(), "uploading flare");

    let reply = transport
        .post_flare(&url, &request.form(), &request.archive)
        .await
        .with_context(|| format!("failed to upload {}", request.archive.display()))?;
    tracing::debug!(status = reply.status, "support endpoint replied");

    UploadOutcome::classify(reply.status, &reply.body)
        .into_result()
        .map_err(anyhow::Error::from)
}
