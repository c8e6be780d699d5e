//! Application service: sanitized temporary copies of configuration files.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::domain::redact::{PASSWORD_FOUND_NOTICE, RedactionMode, redact};

/// Redacted copy of a source file.
///
/// Owns its temporary file; dropping the value deletes it, whichever path
/// the caller leaves by.
#[derive(Debug)]
pub struct SanitizedFile {
    source: PathBuf,
    temp: NamedTempFile,
    password_found: bool,
}

impl SanitizedFile {
    /// File that was read.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Temporary file holding the redacted text.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Whether at least one password line was masked.
    #[must_use]
    pub fn password_found(&self) -> bool {
        self.password_found
    }

    /// Progress suffix for the operator.
    #[must_use]
    pub fn notice(&self) -> &'static str {
        if self.password_found {
            PASSWORD_FOUND_NOTICE
        } else {
            ""
        }
    }
}

/// Read `source`, redact it with `mode` and write the result to a fresh
/// temporary file inside `scratch`. The source is never modified.
///
/// # Errors
///
/// Returns an error if `source` cannot be read or the temporary file cannot
/// be written. No temporary file survives a failure.
pub fn sanitize(source: &Path, mode: RedactionMode, scratch: &Path) -> Result<SanitizedFile> {
    let bytes =
        std::fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
    let input = String::from_utf8_lossy(&bytes);
    let redaction = redact(&input, mode);

    let mut temp = NamedTempFile::new_in(scratch)
        .with_context(|| format!("failed to create temporary file in {}", scratch.display()))?;
    temp.write_all(redaction.text.as_bytes())
        .and_then(|()| temp.flush())
        .with_context(|| format!("failed to write sanitized copy of {}", source.display()))?;

    tracing::debug!(
        source = %source.display(),
        temp = %temp.path().display(),
        password_found = redaction.password_found,
        "sanitized config"
    );

    Ok(SanitizedFile {
        source: source.to_path_buf(),
        temp,
        password_found: redaction.password_found,
    })
}
