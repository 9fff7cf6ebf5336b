//! HTTP endpoint check request and per-attempt observations.
//!
//! Pure types only: no I/O, no async.

use std::fmt;
use std::time::Duration;

use tfprobe_common::{BodyMatch, ExpectedResponse, ObservedResponse};

use crate::domain::error::CheckError;

/// Attempt budget used when neither the caller nor the config sets one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Delay between attempts used when neither the caller nor the config sets one.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Longest body fragment shown in messages.
const PREVIEW_CHARS: usize = 120;

/// What a single GET attempt saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The server answered.
    Response { status: u16, body: String },
    /// No usable response: DNS failure, refused connection, timeout,
    /// malformed URL, unreadable body.
    Transport(String),
}

impl Observation {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Observation::Response { status, .. } => Some(*status),
            Observation::Transport(_) => None,
        }
    }

    /// Convert into the serialisable report form.
    #[must_use]
    pub fn to_observed(&self) -> ObservedResponse {
        match self {
            Observation::Response { status, body } => ObservedResponse::response(*status, body),
            Observation::Transport(msg) => ObservedResponse::transport_error(msg),
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::Response { status, body } => {
                write!(f, "status {status} with body {}", preview(body))
            }
            Observation::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

/// Quote `body` for display, truncating long bodies.
#[must_use]
pub fn preview(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head:?}…")
    } else {
        format!("{head:?}")
    }
}

/// An immutable endpoint check: where to GET, what to expect, and how long
/// to keep trying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCheck {
    url: String,
    headers: Vec<(String, String)>,
    expected_status: u16,
    expected_body: String,
    body_match: BodyMatch,
    max_attempts: u32,
    interval: Duration,
}

impl HttpCheck {
    /// Start building a check for `url` expecting `status` and `body`.
    pub fn builder(
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> HttpCheckBuilder {
        HttpCheckBuilder {
            url: url.into(),
            headers: Vec::new(),
            expected_status: status,
            expected_body: body.into(),
            body_match: BodyMatch::Exact,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn expected_status(&self) -> u16 {
        self.expected_status
    }

    #[must_use]
    pub fn expected_body(&self) -> &str {
        &self.expected_body
    }

    #[must_use]
    pub fn body_match(&self) -> BodyMatch {
        self.body_match
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a response with `status` and `body` satisfies this check.
    #[must_use]
    pub fn accepts(&self, status: u16, body: &str) -> bool {
        status == self.expected_status && self.body_match.matches(&self.expected_body, body)
    }

    #[must_use]
    pub fn expected(&self) -> ExpectedResponse {
        ExpectedResponse {
            status: self.expected_status,
            body: self.expected_body.clone(),
            body_match: self.body_match,
        }
    }
}

/// Builder for [`HttpCheck`]. `build()` enforces `max_attempts >= 1`.
#[derive(Debug, Clone)]
pub struct HttpCheckBuilder {
    url: String,
    headers: Vec<(String, String)>,
    expected_status: u16,
    expected_body: String,
    body_match: BodyMatch,
    max_attempts: u32,
    interval: Duration,
}

impl HttpCheckBuilder {
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn body_match(mut self, body_match: BodyMatch) -> Self {
        self.body_match = body_match;
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Finish the check.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is blank or `max_attempts` is zero. A URL
    /// that is merely malformed is accepted; it fails per attempt as a
    /// transport error.
    pub fn build(self) -> Result<HttpCheck, CheckError> {
        if self.url.trim().is_empty() {
            return Err(CheckError::EmptyUrl);
        }
        if self.max_attempts == 0 {
            return Err(CheckError::ZeroAttempts);
        }
        Ok(HttpCheck {
            url: self.url,
            headers: self.headers,
            expected_status: self.expected_status,
            expected_body: self.expected_body,
            body_match: self.body_match,
            max_attempts: self.max_attempts,
            interval: self.interval,
        })
    }
}

/// Parse a `NAME:VALUE` header argument. Whitespace around both parts is
/// trimmed; the value may itself contain colons.
///
/// # Errors
///
/// Returns an error if there is no colon or the name is empty.
pub fn parse_header(raw: &str) -> Result<(String, String), CheckError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| CheckError::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CheckError::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
