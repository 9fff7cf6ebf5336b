//! `tfprobe run`: apply, probe the endpoint, destroy.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tfprobe_common::{DEFAULT_URL_TEMPLATE, Expectation, ProbeDefinition, TerraformSection};
use tracing::info;

use super::{ExpectArgs, RetryArgs, TerraformArgs, exit_code};
use crate::app::AppContext;
use crate::application::services::deployment::Teardown;
use crate::application::services::probe::{ProbePlan, run_probe};
use crate::domain::config::TfprobeConfig;
use crate::infra::definition::load_definition;

/// Arguments for the run command.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Probe definition file (YAML); flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub terraform: TerraformArgs,

    /// Terraform output holding the endpoint host
    #[arg(long, value_name = "KEY")]
    pub output: Option<String>,

    /// URL to poll; `{output}` is replaced by the output value
    #[arg(long, value_name = "TEMPLATE")]
    pub url_template: Option<String>,

    #[command(flatten)]
    pub expect: ExpectArgs,

    #[command(flatten)]
    pub retry: RetryArgs,

    /// Leave the infrastructure running after the probe
    #[arg(long)]
    pub keep: bool,
}

impl RunArgs {
    /// Combine the definition file, flags and user configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition cannot be loaded or a required
    /// value is given by neither the file nor the flags.
    pub fn resolve(&self, config: &TfprobeConfig) -> Result<(TerraformSection, ProbePlan)> {
        let definition = self.file.as_deref().map(load_definition).transpose()?;
        resolve_plan(self, definition, config)
    }
}

/// Merge a loaded definition with command-line flags and config defaults.
///
/// # Errors
///
/// Returns an error if the output key, expected status or expected body is
/// missing, or the URL template lacks the `{output}` placeholder.
pub fn resolve_plan(
    args: &RunArgs,
    definition: Option<ProbeDefinition>,
    config: &TfprobeConfig,
) -> Result<(TerraformSection, ProbePlan)> {
    let (base, file_output, file_template, file_headers, file_expect, file_retry) =
        match definition {
            Some(d) => (
                Some(d.terraform),
                Some(d.output),
                Some(d.url_template),
                d.headers,
                Some(d.expect),
                d.retry,
            ),
            None => (None, None, None, Default::default(), None, Default::default()),
        };

    let section = args.terraform.section(base)?;
    let output_key = args
        .output
        .clone()
        .or(file_output)
        .context("no output key: pass --output or --file")?;
    let url_template = args
        .url_template
        .clone()
        .or(file_template)
        .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string());
    if !url_template.contains(tfprobe_common::OUTPUT_PLACEHOLDER) {
        anyhow::bail!("url template '{url_template}' does not contain {{output}}");
    }

    let status = args
        .expect
        .status
        .or(file_expect.as_ref().map(|e| e.status))
        .context("no expected status: pass --status or --file")?;
    let body = args
        .expect
        .body
        .clone()
        .or(file_expect.as_ref().map(|e| e.body.clone()))
        .context("no expected body: pass --body or --file")?;
    let body_match = args
        .expect
        .body_match()
        .or(file_expect.map(|e| e.body_match))
        .unwrap_or_default();

    let mut headers: Vec<(String, String)> = file_headers.into_iter().collect();
    headers.extend(args.expect.headers.iter().cloned());

    let plan = ProbePlan {
        output_key,
        url_template,
        headers,
        expect: Expectation {
            status,
            body,
            body_match,
        },
        max_attempts: args.retry.max_attempts(file_retry.max_attempts, config),
        interval: args.retry.interval(file_retry.interval_secs, config),
        deadline: args.retry.deadline(),
        teardown: if args.keep {
            Teardown::Keep
        } else {
            Teardown::Destroy
        },
    };
    plan.validate()?;
    Ok((section, plan))
}

/// Run the run command.
///
/// # Errors
///
/// Returns an error if provisioning, output retrieval or teardown fails.
pub async fn run(app: &AppContext, args: &RunArgs) -> Result<ExitCode> {
    let (section, plan) = args.resolve(&app.config)?;
    info!(dir = %section.dir.display(), output = %plan.output_key, "starting probe");

    let provisioner = app.terraform(&section);
    let http = app.http_probe()?;

    let report = {
        let reporter = app.reporter();
        run_probe(&provisioner, &http, &plan, &reporter, Some(&app.cancel)).await?
    };
    app.renderer().render_report(&report)?;
    Ok(exit_code(&report))
}
