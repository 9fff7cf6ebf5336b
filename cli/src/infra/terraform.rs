//! Infrastructure implementation of the `Provisioner` port.
//!
//! `TerraformProvisioner<R>` routes all terraform CLI calls through a
//! `CommandRunner`, always addressing the root module with `-chdir` so the
//! process working directory never changes.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};
use tfprobe_common::TerraformSection;
use tracing::{debug, info};

use crate::application::ports::{CommandRunner, Provisioner};
use crate::domain::ProvisionError;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};

/// Infrastructure adapter that drives one Terraform root module.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct TerraformProvisioner<R: CommandRunner> {
    runner: R,
    binary: String,
    dir: PathBuf,
    vars: BTreeMap<String, String>,
    var_files: Vec<PathBuf>,
    apply_timeout: Duration,
}

impl<R: CommandRunner> TerraformProvisioner<R> {
    /// Create a provisioner for the root module at `dir`.
    pub fn new(runner: R, binary: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            binary: binary.into(),
            dir: dir.into(),
            vars: BTreeMap::new(),
            var_files: Vec::new(),
            apply_timeout: Duration::from_secs(30 * 60),
        }
    }

    /// Pass `-var name=value` to apply and destroy.
    #[must_use]
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Pass `-var-file path` to apply and destroy.
    #[must_use]
    pub fn var_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.var_files.push(path.into());
        self
    }

    /// Timeout for `init`, `apply` and `destroy`.
    #[must_use]
    pub fn apply_timeout(mut self, timeout: Duration) -> Self {
        self.apply_timeout = timeout;
        self
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn chdir_arg(&self) -> String {
        format!("-chdir={}", self.dir.display())
    }

    /// `-var`/`-var-file` flags shared by apply and destroy.
    fn variable_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (name, value) in &self.vars {
            args.push("-var".to_string());
            args.push(format!("{name}={value}"));
        }
        for file in &self.var_files {
            args.push("-var-file".to_string());
            args.push(file.display().to_string());
        }
        args
    }

    async fn terraform(
        &self,
        step: &'static str,
        extra: &[String],
        timeout: Duration,
    ) -> Result<Output> {
        let chdir = self.chdir_arg();
        let mut args: Vec<&str> = vec![chdir.as_str(), step];
        args.extend(extra.iter().map(String::as_str));
        debug!(binary = %self.binary, ?args, "running terraform");

        let output = self
            .runner
            .run_with_timeout(&self.binary, &args, timeout)
            .await
            .with_context(|| format!("terraform {step}"))?;
        if !output.status.success() {
            return Err(ProvisionError::CommandFailed {
                step,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }
        Ok(output)
    }
}

impl TerraformProvisioner<TokioCommandRunner> {
    /// Convenience constructor for production use, built from a probe
    /// definition's terraform section.
    #[must_use]
    pub fn from_section(binary: &str, section: &TerraformSection, apply_timeout: Duration) -> Self {
        let runner = TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT).with_env("TF_IN_AUTOMATION", "1");
        let mut provisioner =
            Self::new(runner, binary, section.dir.clone()).apply_timeout(apply_timeout);
        for (name, value) in &section.vars {
            provisioner = provisioner.var(name, value);
        }
        for file in &section.var_files {
            provisioner = provisioner.var_file(file);
        }
        provisioner
    }
}

impl<R: CommandRunner> Provisioner for TerraformProvisioner<R> {
    async fn init_and_apply(&self) -> Result<()> {
        let init = ["-input=false".to_string(), "-no-color".to_string()];
        self.terraform("init", &init, self.apply_timeout).await?;

        let mut apply = vec![
            "-input=false".to_string(),
            "-auto-approve".to_string(),
            "-no-color".to_string(),
        ];
        apply.extend(self.variable_args());
        self.terraform("apply", &apply, self.apply_timeout).await?;
        info!(dir = %self.dir.display(), "terraform apply complete");
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        let mut destroy = vec![
            "-input=false".to_string(),
            "-auto-approve".to_string(),
            "-no-color".to_string(),
        ];
        destroy.extend(self.variable_args());
        self.terraform("destroy", &destroy, self.apply_timeout).await?;
        info!(dir = %self.dir.display(), "terraform destroy complete");
        Ok(())
    }

    async fn output(&self, key: &str) -> Result<String> {
        let args = ["-json".to_string(), "-no-color".to_string()];
        let output = self.terraform("output", &args, DEFAULT_CMD_TIMEOUT).await?;
        parse_output(&output.stdout, key)
    }
}

/// Extract `key` from `terraform output -json`.
///
/// The JSON maps each output name to `{"value": ..., "type": ..., "sensitive": ...}`.
/// String values are returned verbatim; any other JSON value is returned
/// serialised.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or the key is absent.
pub fn parse_output(stdout: &[u8], key: &str) -> Result<String> {
    let outputs: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| ProvisionError::InvalidOutputJson(e.to_string()))?;
    let value = outputs
        .get(key)
        .and_then(|entry| entry.get("value"))
        .ok_or_else(|| ProvisionError::MissingOutput(key.to_string()))?;
    Ok(match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
