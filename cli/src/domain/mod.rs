//! Domain layer: pure redaction, archive layout and upload rules.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod bundle;
pub mod error;
pub mod redact;
pub mod upload;

pub use bundle::{BundleLayout, archive_file_name};
pub use error::FlareError;
pub use redact::{Redaction, RedactionMode, redact};
pub use upload::{UploadOutcome, UploadRequest, check_size, support_url};
