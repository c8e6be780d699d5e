//! Typed domain error enum.
//!
//! Every variant converts to `anyhow::Error` via `?`; the command layer
//! recovers them with `downcast_ref` when it needs the variant.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal outcomes of a flare run.
#[derive(Debug, Error)]
pub enum FlareError {
    #[error(
        "No API key configured. Set api_key in the flare configuration or export DD_API_KEY."
    )]
    MissingApiKey,

    #[error(
        "{} won't be uploaded, its size is too important ({size} bytes).\nYou can send it directly to support by mail.",
        path.display()
    )]
    SizeLimitExceeded { path: PathBuf, size: u64 },

    #[error("Aborting (you can still use {})", path.display())]
    UserAborted { path: PathBuf },

    #[error("An email address is required when no case id is given. Pass --email or answer the prompt.")]
    EmailRequired,

    #[error("Your request is incorrect, error {0}")]
    ClientError(String),

    #[error("An error has occurred while uploading: {0}")]
    ServerError(String),

    #[error(
        "An unknown error has occurred while uploading ({0}).\nPlease contact support by email."
    )]
    UnknownError(String),
}
