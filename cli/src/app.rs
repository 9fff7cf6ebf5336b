//! Application context: unified state passed to every command handler.
//!
//! `AppContext` is built once in `Cli::run()` from the global flags and the
//! user configuration, and handed to each command as `&AppContext`.

use anyhow::Result;
use tfprobe_common::TerraformSection;
use tokio_util::sync::CancellationToken;

use crate::application::ports::ConfigStore;
use crate::application::services::config_service;
use crate::domain::config::TfprobeConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::http::ReqwestHttpProbe;
use crate::infra::terraform::TerraformProvisioner;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// User configuration store.
    pub config_store: YamlConfigStore,
    /// Configuration loaded at startup.
    pub config: TfprobeConfig,
    /// Fired on Ctrl-C or when a command's deadline passes.
    pub cancel: CancellationToken,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or holds an
    /// invalid value.
    pub fn new(flags: &OutputFlags, cancel: CancellationToken) -> Result<Self> {
        let config = config_service::load_config(&YamlConfigStore)?;
        Ok(Self::with_config(flags, cancel, config))
    }

    /// Like [`AppContext::new`] but without validating setting values, so a
    /// hand-edited file can still be repaired with `config set`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn unvalidated(flags: &OutputFlags, cancel: CancellationToken) -> Result<Self> {
        let config = YamlConfigStore.load()?;
        Ok(Self::with_config(flags, cancel, config))
    }

    fn with_config(flags: &OutputFlags, cancel: CancellationToken, config: TfprobeConfig) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            mode,
            config_store: YamlConfigStore,
            config,
            cancel,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress reporter for long-running commands. Silent in JSON mode so
    /// stdout carries only the JSON document.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        if self.is_json() {
            TerminalReporter::silent(&self.output)
        } else {
            TerminalReporter::new(&self.output)
        }
    }

    /// Provisioner for a Terraform root module, using the configured binary.
    #[must_use]
    pub fn terraform(&self, section: &TerraformSection) -> TerraformProvisioner<TokioCommandRunner> {
        TerraformProvisioner::from_section(
            &self.config.terraform.binary,
            section,
            self.config.apply_timeout(),
        )
    }

    /// HTTP client honouring `http.timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn http_probe(&self) -> Result<ReqwestHttpProbe> {
        ReqwestHttpProbe::new(self.config.http_timeout())
    }
}
