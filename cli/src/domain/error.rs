//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::check::{Observation, preview};

// ── Check construction errors ─────────────────────────────────────────────────

/// Errors raised while building an [`HttpCheck`](crate::domain::HttpCheck).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("max attempts must be at least 1")]
    ZeroAttempts,

    #[error("invalid header '{0}': expected NAME:VALUE")]
    InvalidHeader(String),
}

// ── Poll errors ───────────────────────────────────────────────────────────────

/// Terminal failure states of the HTTP poller.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(
        "{url} did not return status {expected_status} with body {} after {attempts} attempts; last observed {last}",
        preview(expected_body)
    )]
    Exhausted {
        url: String,
        attempts: u32,
        expected_status: u16,
        expected_body: String,
        last: Observation,
    },

    #[error("polling {url} was cancelled after {attempts} attempts")]
    Cancelled {
        url: String,
        attempts: u32,
        last: Option<Observation>,
    },
}

impl PollError {
    /// Number of attempts made before the poller gave up.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            PollError::Exhausted { attempts, .. } | PollError::Cancelled { attempts, .. } => {
                *attempts
            }
        }
    }

    /// The last response or transport error seen, if any attempt ran.
    #[must_use]
    pub fn last_observation(&self) -> Option<&Observation> {
        match self {
            PollError::Exhausted { last, .. } => Some(last),
            PollError::Cancelled { last, .. } => last.as_ref(),
        }
    }
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors raised by the infrastructure provisioner.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("terraform {step} failed{}: {}", exit_suffix(*code), stderr.trim())]
    CommandFailed {
        step: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error("required output '{0}' is not defined. Check the module's outputs.tf.")]
    MissingOutput(String),

    #[error("required output '{0}' is empty")]
    EmptyOutput(String),

    #[error("cannot parse terraform output JSON: {0}")]
    InvalidOutputJson(String),
}

fn exit_suffix(code: Option<i32>) -> String {
    code.map_or_else(|| " (terminated by signal)".to_string(), |c| format!(" (exit {c})"))
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
