//! Domain types and validators for tfprobe configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::check::{DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS};
use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "terraform.binary",
    "terraform.apply_timeout_secs",
    "poll.max_attempts",
    "poll.interval_secs",
    "http.timeout_secs",
];

const DEFAULT_APPLY_TIMEOUT_SECS: u64 = 30 * 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.tfprobe/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TfprobeConfig {
    pub terraform: TerraformConfig,
    pub poll: PollConfig,
    pub http: HttpConfig,
}

/// How the `terraform` CLI is invoked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TerraformConfig {
    /// Executable name or path, e.g. `terraform` or `tofu`.
    pub binary: String,
    /// Timeout for `init`, `apply` and `destroy`.
    pub apply_timeout_secs: u64,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary: "terraform".to_string(),
            apply_timeout_secs: DEFAULT_APPLY_TIMEOUT_SECS,
        }
    }
}

/// Default retry policy for probes that do not set one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval_secs: DEFAULT_INTERVAL.as_secs(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout. A timed-out request counts as a failed attempt.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl TfprobeConfig {
    #[must_use]
    pub fn apply_timeout(&self) -> Duration {
        Duration::from_secs(self.terraform.apply_timeout_secs)
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Read a setting by dotted key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown.
    pub fn get(&self, key: &str) -> Result<String> {
        validate_config_key(key)?;
        Ok(match key {
            "terraform.binary" => self.terraform.binary.clone(),
            "terraform.apply_timeout_secs" => self.terraform.apply_timeout_secs.to_string(),
            "poll.max_attempts" => self.poll.max_attempts.to_string(),
            "poll.interval_secs" => self.poll.interval_secs.to_string(),
            "http.timeout_secs" => self.http.timeout_secs.to_string(),
            _ => anyhow::bail!("Unknown setting: {key}"),
        })
    }

    /// Check every setting as `set` would, e.g. after reading a hand-edited file.
    ///
    /// # Errors
    ///
    /// Returns the first setting whose value is invalid.
    pub fn validate(&self) -> Result<()> {
        for key in VALID_CONFIG_KEYS {
            validate_config_value(key, &self.get(key)?)?;
        }
        Ok(())
    }

    /// Validate and apply a setting by dotted key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "terraform.binary" => self.terraform.binary = value.to_string(),
            "terraform.apply_timeout_secs" => {
                self.terraform.apply_timeout_secs = parse_number(key, value)?;
            }
            "poll.max_attempts" => self.poll.max_attempts = parse_number(key, value)?,
            "poll.interval_secs" => self.poll.interval_secs = parse_number(key, value)?,
            "http.timeout_secs" => self.http.timeout_secs = parse_number(key, value)?,
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    match key {
        "terraform.binary" if value.trim().is_empty() => {
            Err(invalid("Binary must not be empty").into())
        }
        "poll.max_attempts" => match value.parse::<u32>() {
            Ok(0) | Err(_) => Err(invalid("Must be a whole number of at least 1").into()),
            Ok(_) => Ok(()),
        },
        "terraform.apply_timeout_secs" | "http.timeout_secs" => match value.parse::<u64>() {
            Ok(0) | Err(_) => Err(invalid("Must be a whole number of seconds, at least 1").into()),
            Ok(_) => Ok(()),
        },
        "poll.interval_secs" => match value.parse::<u64>() {
            Ok(_) => Ok(()),
            Err(_) => Err(invalid("Must be a whole number of seconds").into()),
        },
        _ => Ok(()),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "Must be a whole number".to_string(),
        }
        .into()
    })
}

// ── Unit tests ───────────────────────────────────────────────────────────────
