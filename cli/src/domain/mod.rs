//! Domain layer: pure types, matching rules and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod check;
pub mod config;
pub mod error;

pub use check::{DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS, HttpCheck, HttpCheckBuilder, Observation};
pub use config::{TfprobeConfig, validate_config_key, validate_config_value};
pub use error::{CheckError, ConfigError, PollError, ProvisionError};
