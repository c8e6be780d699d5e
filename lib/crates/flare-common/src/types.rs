use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path of the support endpoint, appended to the configured `dd_url`.
pub const SUPPORT_PATH: &str = "/zendesk/flare";

/// Multipart field carrying the archive bytes.
pub const FLARE_FILE_FIELD: &str = "flare_file";

/// Agent component that leaves a status report behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Collector,
    Dogstatsd,
    Forwarder,
}

impl Component {
    /// Components in the order their status is reported in `info.log`.
    pub const ALL: [Component; 3] = [Self::Collector, Self::Dogstatsd, Self::Forwarder];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Collector => "collector",
            Self::Dogstatsd => "dogstatsd",
            Self::Forwarder => "forwarder",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Collector => "Collector",
            Self::Dogstatsd => "Dogstatsd",
            Self::Forwarder => "Forwarder",
        }
    }
}

/// Text fields sent alongside the archive.
///
/// `case_id` and `email` are nullable; absent values are left out of the
/// form entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlareForm {
    pub api_key: String,
    pub case_id: Option<String>,
    pub hostname: String,
    pub email: Option<String>,
}

impl FlareForm {
    /// Present fields, in wire order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![("api_key", self.api_key.as_str())];
        if let Some(case_id) = &self.case_id {
            fields.push(("case_id", case_id.as_str()));
        }
        fields.push(("hostname", self.hostname.as_str()));
        if let Some(email) = &self.email {
            fields.push(("email", email.as_str()));
        }
        fields
    }
}

/// Body returned by the support endpoint on success.
#[derive(Debug, Deserialize)]
pub struct SupportCaseResponse {
    pub case_id: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("support response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("support response has an empty case_id")]
    EmptyCaseId,
}

impl SupportCaseResponse {
    /// Parse a success body and return the case id as text.
    ///
    /// The endpoint has returned both numeric and string ids.
    pub fn parse_case_id(body: &str) -> Result<String, WireError> {
        let resp: Self = serde_json::from_str(body)?;
        match resp.case_id {
            serde_json::Value::String(s) if !s.is_empty() => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            _ => Err(WireError::EmptyCaseId),
        }
    }
}
