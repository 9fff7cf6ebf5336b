//! `tfprobe poll`: poll a URL without provisioning anything.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use super::{ExpectArgs, RetryArgs, exit_code};
use crate::app::AppContext;
use crate::application::services::probe::poll_url;
use crate::domain::HttpCheck;
use crate::domain::config::TfprobeConfig;

/// Arguments for the poll command.
#[derive(Args, Debug)]
pub struct PollArgs {
    /// URL to request
    pub url: String,

    #[command(flatten)]
    pub expect: ExpectArgs,

    #[command(flatten)]
    pub retry: RetryArgs,
}

impl PollArgs {
    /// Build the check these arguments describe.
    ///
    /// # Errors
    ///
    /// Returns an error if `--status` or `--body` is missing, or the URL is blank.
    pub fn check(&self, config: &TfprobeConfig) -> Result<HttpCheck> {
        let status = self.expect.status.context("--status is required")?;
        let body = self.expect.body.clone().context("--body is required")?;
        let check = HttpCheck::builder(self.url.clone(), status, body)
            .headers(self.expect.headers.iter().cloned())
            .body_match(self.expect.body_match().unwrap_or_default())
            .max_attempts(self.retry.max_attempts(None, config))
            .interval(self.retry.interval(None, config))
            .build()?;
        Ok(check)
    }
}

/// Run the poll command.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the HTTP client cannot be built.
pub async fn run(app: &AppContext, args: &PollArgs) -> Result<ExitCode> {
    let check = args.check(&app.config)?;
    let http = app.http_probe()?;

    let report = {
        let reporter = app.reporter();
        poll_url(
            &http,
            &check,
            &reporter,
            Some(&app.cancel),
            args.retry.deadline(),
        )
        .await
    };
    app.renderer().render_report(&report)?;
    Ok(exit_code(&report))
}
