//! Infrastructure implementation of the `SupportTransport` port.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use flare_common::{FLARE_FILE_FIELD, FlareForm};
use reqwest::multipart::{Form, Part};

use crate::application::ports::{HttpReply, SupportTransport};

/// Upper bound on one upload request, connect through response body.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Multipart upload over `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("datadog-flare/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client })
    }
}

impl SupportTransport for ReqwestTransport {
    async fn post_flare(&self, url: &str, form: &FlareForm, archive: &Path) -> Result<HttpReply> {
        let bytes = tokio::fs::read(archive)
            .await
            .with_context(|| format!("failed to read {}", archive.display()))?;
        let file_name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/x-bzip2")?;

        let mut body = Form::new().part(FLARE_FILE_FIELD, part);
        for (name, value) in form.fields() {
            body = body.text(name, value.to_string());
        }

        let response = self
            .client
            .post(url)
            .multipart(body)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response from {url}"))?;
        Ok(HttpReply { status, body })
    }
}
