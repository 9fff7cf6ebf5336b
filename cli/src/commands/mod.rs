//! Command implementations

pub mod config;
pub mod destroy;
pub mod poll;
pub mod run;
pub mod tf_output;
pub mod version;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tfprobe_common::{BodyMatch, ProbeReport, TerraformSection};

use crate::domain::check::parse_header;
use crate::domain::config::TfprobeConfig;
use crate::infra::definition::load_definition;

/// Terraform root module selection, shared by `run`, `output` and `destroy`.
#[derive(Args, Debug, Default)]
pub struct TerraformArgs {
    /// Directory containing the Terraform root module
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Terraform variable passed to apply and destroy (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Terraform variable file (repeatable)
    #[arg(long = "var-file", value_name = "FILE")]
    pub var_files: Vec<PathBuf>,
}

impl TerraformArgs {
    /// Merge flags over an optional base section from a probe definition.
    ///
    /// Flag variables override same-named definition variables; flag var files
    /// are appended after the definition's.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the flags nor the base name a directory.
    pub fn section(&self, base: Option<TerraformSection>) -> Result<TerraformSection> {
        let mut section = match (base, &self.dir) {
            (Some(mut base), Some(dir)) => {
                base.dir.clone_from(dir);
                base
            }
            (Some(base), None) => base,
            (None, Some(dir)) => TerraformSection {
                dir: dir.clone(),
                vars: std::collections::BTreeMap::new(),
                var_files: Vec::new(),
            },
            (None, None) => anyhow::bail!("no Terraform directory: pass --dir or --file"),
        };
        for (name, value) in &self.vars {
            section.vars.insert(name.clone(), value.clone());
        }
        section.var_files.extend(self.var_files.iter().cloned());
        Ok(section)
    }

    /// Merge flags over the terraform section of a definition file, if given.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition cannot be loaded or no directory
    /// is named.
    pub fn section_from(&self, file: Option<&Path>) -> Result<TerraformSection> {
        let base = file.map(load_definition).transpose()?.map(|d| d.terraform);
        self.section(base)
    }
}

/// Expected response flags.
#[derive(Args, Debug, Default)]
pub struct ExpectArgs {
    /// Expected HTTP status code
    #[arg(long, value_name = "CODE", value_parser = clap::value_parser!(u16).range(100..=599))]
    pub status: Option<u16>,

    /// Expected response body
    #[arg(long, value_name = "TEXT")]
    pub body: Option<String>,

    /// How the response body is compared with --body
    #[arg(long = "match", value_enum, value_name = "MODE")]
    pub body_match: Option<BodyMatch>,

    /// Shorthand for --match contains
    #[arg(long, conflicts_with = "body_match")]
    pub contains: bool,

    /// Request header (repeatable)
    #[arg(long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

impl ExpectArgs {
    /// Body match mode selected by `--match` or `--contains`, if any.
    #[must_use]
    pub fn body_match(&self) -> Option<BodyMatch> {
        self.body_match
            .or_else(|| self.contains.then_some(BodyMatch::Contains))
    }
}

/// Retry policy flags.
#[derive(Args, Debug, Default)]
pub struct RetryArgs {
    /// Maximum number of requests [default: poll.max_attempts]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub attempts: Option<u32>,

    /// Seconds to wait between attempts [default: poll.interval_secs]
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Stop polling this many seconds after the first request
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,
}

impl RetryArgs {
    /// Resolve the attempt budget: flag, then definition, then config.
    #[must_use]
    pub fn max_attempts(&self, from_file: Option<u32>, config: &TfprobeConfig) -> u32 {
        self.attempts
            .or(from_file)
            .unwrap_or(config.poll.max_attempts)
    }

    /// Resolve the inter-attempt delay: flag, then definition, then config.
    #[must_use]
    pub fn interval(&self, from_file: Option<u64>, config: &TfprobeConfig) -> Duration {
        Duration::from_secs(
            self.interval
                .or(from_file)
                .unwrap_or(config.poll.interval_secs),
        )
    }

    /// Polling deadline from `--deadline`.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline.map(Duration::from_secs)
    }
}

/// Exit code for a finished probe.
#[must_use]
pub fn exit_code(report: &ProbeReport) -> ExitCode {
    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Parse a `NAME=VALUE` Terraform variable.
///
/// # Errors
///
/// Returns an error if there is no `=` or the name is empty.
pub fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid variable '{raw}': expected NAME=VALUE")),
    }
}
