//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{Observation, TfprobeConfig};

// ── Provisioner Port ──────────────────────────────────────────────────────────

/// Applies and destroys one declarative infrastructure definition and reads
/// its outputs. The definition (root module, variables) is fixed when the
/// implementation is constructed.
#[allow(async_fn_in_trait)]
pub trait Provisioner {
    /// Initialise the working directory and apply the definition.
    async fn init_and_apply(&self) -> Result<()>;
    /// Destroy everything the definition created. Safe to call when nothing
    /// was applied.
    async fn destroy(&self) -> Result<()>;
    /// Read a named output.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::MissingOutput`](crate::domain::ProvisionError)
    /// if the output is not defined.
    async fn output(&self, key: &str) -> Result<String>;
}

// ── HTTP Port ─────────────────────────────────────────────────────────────────

/// Issues a single HTTP GET.
#[allow(async_fn_in_trait)]
pub trait HttpProbe {
    /// GET `url` with `headers`. Every failure to obtain a response (bad URL,
    /// DNS, connect, timeout, unreadable body) is reported as
    /// [`Observation::Transport`]; this call itself never fails.
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Observation;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts persistence of user configuration.
pub trait ConfigStore {
    /// Load configuration, returning defaults when no file exists.
    fn load(&self) -> Result<TfprobeConfig>;
    /// Persist configuration.
    fn save(&self, config: &TfprobeConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
