use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a response body is compared with the expected body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum BodyMatch {
    /// Byte-for-byte equality, whitespace included.
    #[default]
    Exact,
    /// The expected body must appear somewhere in the response body.
    Contains,
}

impl BodyMatch {
    /// Compare an actual response body against the expected one.
    #[must_use]
    pub fn matches(self, expected: &str, actual: &str) -> bool {
        match self {
            BodyMatch::Exact => expected == actual,
            BodyMatch::Contains => actual.contains(expected),
        }
    }
}

impl std::fmt::Display for BodyMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BodyMatch::Exact => f.write_str("exact"),
            BodyMatch::Contains => f.write_str("contains"),
        }
    }
}

/// Final result of a probe run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

/// The response a probe was waiting for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpectedResponse {
    pub status: u16,
    pub body: String,
    #[serde(rename = "match", default)]
    pub body_match: BodyMatch,
}

/// The last thing a probe saw. Either a response (status and body) or a
/// transport error message, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ObservedResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ObservedResponse {
    #[must_use]
    pub fn response(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
            error: None,
        }
    }

    #[must_use]
    pub fn transport_error(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            error: Some(message.into()),
        }
    }
}

/// Provisioner output the probe URL was built from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub key: String,
    pub value: String,
}

/// Machine-readable summary of a `run` or `poll` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub verdict: Verdict,
    pub url: String,
    /// Attempts actually made.
    pub attempts: u32,
    /// Attempt budget.
    pub max_attempts: u32,
    pub expected: ExpectedResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<ObservedResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<ResolvedOutput>,
    /// Failure summary. `None` when the probe passed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ProbeReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}
