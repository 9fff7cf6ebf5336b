//! Probe definition file schema.
//!
//! A probe definition describes one end-to-end check: which Terraform root
//! module to apply, which output to read, how to turn it into a URL and what
//! the endpoint must answer.
//!
//! ```yaml
//! terraform:
//!   dir: examples/networking/alb
//! output: alb_dns_name
//! expect:
//!   status: 404
//!   body: "404: page not found"
//! retry:
//!   max_attempts: 10
//!   interval_secs: 10
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::BodyMatch;

/// Placeholder replaced by the output value in `url_template`.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// URL template used when a definition does not set one.
pub const DEFAULT_URL_TEMPLATE: &str = "http://{output}";

/// Errors found while validating a probe definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("output key must not be empty")]
    EmptyOutputKey,

    #[error("url_template '{0}' does not contain the {{output}} placeholder")]
    MissingPlaceholder(String),

    #[error("retry.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("invalid status code {0}: must be between 100 and 599")]
    InvalidStatus(u16),
}

/// Terraform root module settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TerraformSection {
    /// Directory holding the root module.
    pub dir: PathBuf,
    /// `-var name=value` pairs passed to apply and destroy.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,
    /// `-var-file` paths passed to apply and destroy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub var_files: Vec<PathBuf>,
}

/// The response the endpoint must eventually return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Expectation {
    pub status: u16,
    pub body: String,
    #[serde(rename = "match", default)]
    pub body_match: BodyMatch,
}

/// Retry policy. Unset fields fall back to user configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RetrySection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
}

/// Top-level probe definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeDefinition {
    pub terraform: TerraformSection,
    /// Name of the required Terraform output.
    pub output: String,
    #[serde(default = "default_url_template")]
    pub url_template: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub expect: Expectation,
    #[serde(default)]
    pub retry: RetrySection,
}

fn default_url_template() -> String {
    DEFAULT_URL_TEMPLATE.to_string()
}

impl ProbeDefinition {
    /// Check the definition for values that can never produce a passing probe.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.output.trim().is_empty() {
            return Err(DefinitionError::EmptyOutputKey);
        }
        if !self.url_template.contains(OUTPUT_PLACEHOLDER) {
            return Err(DefinitionError::MissingPlaceholder(self.url_template.clone()));
        }
        if self.retry.max_attempts == Some(0) {
            return Err(DefinitionError::ZeroAttempts);
        }
        if !(100..=599).contains(&self.expect.status) {
            return Err(DefinitionError::InvalidStatus(self.expect.status));
        }
        Ok(())
    }
}

/// Substitute every `{output}` placeholder in `template` with `value`.
#[must_use]
pub fn render_url(template: &str, value: &str) -> String {
    template.replace(OUTPUT_PLACEHOLDER, value.trim())
}
