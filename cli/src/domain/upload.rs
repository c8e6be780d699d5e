//! Upload rules: size gate, request validation, endpoint URL and response
//! classification. No I/O.

use std::path::{Path, PathBuf};

use flare_common::{FlareForm, SUPPORT_PATH, SupportCaseResponse};

use crate::domain::error::FlareError;

/// Largest archive accepted for upload (arbitrary ceiling, not server-enforced).
pub const MAX_UPLOAD_SIZE: u64 = 10_485_000;

/// Reject archives above [`MAX_UPLOAD_SIZE`].
///
/// # Errors
///
/// Returns [`FlareError::SizeLimitExceeded`] when `size` is over the limit.
pub fn check_size(path: &Path, size: u64) -> Result<(), FlareError> {
    if size > MAX_UPLOAD_SIZE {
        return Err(FlareError::SizeLimitExceeded {
            path: path.to_path_buf(),
            size,
        });
    }
    Ok(())
}

/// Everything needed for the one multipart POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub archive: PathBuf,
    pub api_key: String,
    pub hostname: String,
    pub case_id: Option<String>,
    pub email: Option<String>,
}

impl UploadRequest {
    /// Build a request, enforcing that a ticket is identified either by an
    /// existing case id or by the operator's email.
    ///
    /// # Errors
    ///
    /// Returns [`FlareError::EmailRequired`] when neither is present.
    pub fn new(
        archive: PathBuf,
        api_key: String,
        hostname: String,
        case_id: Option<String>,
        email: Option<String>,
    ) -> Result<Self, FlareError> {
        let email = email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        if case_id.is_none() && email.is_none() {
            return Err(FlareError::EmailRequired);
        }
        Ok(Self {
            archive,
            api_key,
            hostname,
            case_id,
            email,
        })
    }

    #[must_use]
    pub fn form(&self) -> FlareForm {
        FlareForm {
            api_key: self.api_key.clone(),
            case_id: self.case_id.clone(),
            hostname: self.hostname.clone(),
            email: self.email.clone(),
        }
    }
}

/// `<dd_url>/zendesk/flare[/<case_id>]`
#[must_use]
pub fn support_url(dd_url: &str, case_id: Option<&str>) -> String {
    let base = format!("{}{SUPPORT_PATH}", dd_url.trim_end_matches('/'));
    match case_id {
        Some(id) => format!("{base}/{id}"),
        None => base,
    }
}

/// Classified result of the upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// 200 with a parsable case id.
    Success { case_id: String },
    /// 400: the request was rejected; carries the raw body.
    ClientError(String),
    /// 500: the server failed; carries the raw body.
    ServerError(String),
    /// Anything else, including a 200 without a case id.
    UnknownError(String),
}

impl UploadOutcome {
    /// Classify an HTTP status and body.
    #[must_use]
    pub fn classify(status: u16, body: &str) -> Self {
        match status {
            200 => match SupportCaseResponse::parse_case_id(body) {
                Ok(case_id) => Self::Success { case_id },
                Err(_) => Self::UnknownError(body.to_string()),
            },
            400 => Self::ClientError(body.to_string()),
            500 => Self::ServerError(body.to_string()),
            _ => Self::UnknownError(body.to_string()),
        }
    }

    /// Turn a non-success outcome into the fatal error for this run.
    ///
    /// # Errors
    ///
    /// Returns the matching [`FlareError`] for every variant but `Success`.
    pub fn into_result(self) -> Result<String, FlareError> {
        match self {
            Self::Success { case_id } => Ok(case_id),
            Self::ClientError(body) => Err(FlareError::ClientError(body)),
            Self::ServerError(body) => Err(FlareError::ServerError(body)),
            Self::UnknownError(body) => Err(FlareError::UnknownError(body)),
        }
    }
}

/// Operator message after a successful upload.
#[must_use]
pub fn success_message(case_id: &str) -> String {
    format!(
        "Your logs were successfully uploaded. For future reference, your internal case id is {case_id}"
    )
}
