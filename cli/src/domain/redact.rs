//! Line-oriented secret redaction, pure text in and text out.
//!
//! Two modes exist. The main agent config gets comment stripping plus API
//! key masking; per-check configs get comment stripping plus password
//! masking. Comment filtering always wins: a comment line is never emitted,
//! whatever else it matches.

use regex::Regex;
use std::sync::LazyLock;

/// A line whose first non-blank character is `#`.
pub static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^\s*#").expect("valid regex")
});

/// `<indent><word chars>pass[word]: <value>`; group 1 is the key part that
/// survives masking.
pub static PASSWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(\s*[0-9A-Za-z_]*pass(?:word)?:).+").expect("valid regex")
});

/// `api_key: <token>`; group 1 holds the five trailing characters left visible.
pub static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^api_key: *[0-9A-Za-z_]+([0-9A-Za-z_]{5})$").expect("valid regex")
});

/// Replacement value for a password.
pub const PASSWORD_MASK: &str = "********";

/// Number of mask characters placed before the visible API key suffix.
pub const API_KEY_MASK_LEN: usize = 29;

/// Shown next to a check config that had a password masked.
pub const PASSWORD_FOUND_NOTICE: &str =
    " - this file contains a password which has been removed in the version collected";

/// Which secrets to look for besides comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedactionMode {
    /// Main agent configuration: mask the `api_key` line.
    ApiKey,
    /// Check configuration: mask every password line.
    Password,
}

/// Sanitized text plus whether a password line was masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub text: String,
    pub password_found: bool,
}

/// Redact `input` according to `mode`, keeping line terminators intact.
#[must_use]
pub fn redact(input: &str, mode: RedactionMode) -> Redaction {
    let mut text = String::with_capacity(input.len());
    let mut password_found = false;

    for (line, eol) in lines_with_eol(input) {
        let kept = match mode {
            RedactionMode::Password => {
                if COMMENT_RE.is_match(line) {
                    None
                } else if PASSWORD_RE.is_match(line) {
                    password_found = true;
                    Some(mask_password(line))
                } else {
                    Some(line.to_string())
                }
            }
            RedactionMode::ApiKey => {
                let masked = mask_api_key(line);
                (!COMMENT_RE.is_match(&masked)).then_some(masked)
            }
        };
        if let Some(kept) = kept {
            text.push_str(&kept);
            text.push_str(eol);
        }
    }

    Redaction {
        text,
        password_found,
    }
}

fn mask_password(line: &str) -> String {
    PASSWORD_RE
        .replace(line, format!("${{1}} {PASSWORD_MASK}").as_str())
        .into_owned()
}

fn mask_api_key(line: &str) -> String {
    let mask = "*".repeat(API_KEY_MASK_LEN);
    API_KEY_RE
        .replace(line, format!("api_key: {mask}${{1}}").as_str())
        .into_owned()
}

/// Split `input` into `(content, terminator)` pairs. `\r\n`, `\n` and a
/// lone `\r` all end a line; the last line may have no terminator.
fn lines_with_eol(input: &str) -> Vec<(&str, &str)> {
    let bytes = input.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let eol_len = match bytes[i] {
            b'\n' => 1,
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\r' => 1,
            _ => {
                i += 1;
                continue;
            }
        };
        lines.push((&input[start..i], &input[i..i + eol_len]));
        i += eol_len;
        start = i;
    }
    if start < input.len() {
        lines.push((&input[start..], ""));
    }
    lines
}
