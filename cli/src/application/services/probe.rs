//! Application service: end-to-end probe: deploy, resolve URL, poll, report.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tfprobe_common::{
    Expectation, ObservedResponse, ProbeReport, ResolvedOutput, Verdict, render_url,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::application::ports::{HttpProbe, ProgressReporter, Provisioner};
use crate::application::services::deployment::{Teardown, output_required, with_deployment};
use crate::application::services::poller::{PollSuccess, poll_within};
use crate::domain::{CheckError, HttpCheck, Observation, PollError};

/// Everything a probe run needs once file, flags and config are merged.
#[derive(Debug, Clone)]
pub struct ProbePlan {
    /// Output holding the endpoint host (e.g. an ALB DNS name).
    pub output_key: String,
    /// URL template containing `{output}`.
    pub url_template: String,
    pub headers: Vec<(String, String)>,
    pub expect: Expectation,
    pub max_attempts: u32,
    pub interval: Duration,
    /// Bound on the polling phase, counted from the first request.
    pub deadline: Option<Duration>,
    pub teardown: Teardown,
}

impl ProbePlan {
    /// Reject a plan that no output value could make pass, before anything
    /// is provisioned.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::ZeroAttempts`] for an empty attempt budget.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(CheckError::ZeroAttempts.into());
        }
        Ok(())
    }

    /// Build the check for a resolved output value.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting check is invalid (zero attempts, blank URL).
    pub fn check_for(&self, output_value: &str) -> Result<HttpCheck> {
        let check = HttpCheck::builder(
            render_url(&self.url_template, output_value),
            self.expect.status,
            self.expect.body.clone(),
        )
        .headers(self.headers.iter().cloned())
        .body_match(self.expect.body_match)
        .max_attempts(self.max_attempts)
        .interval(self.interval)
        .build()?;
        Ok(check)
    }
}

/// Apply the infrastructure, read the required output, poll the endpoint it
/// names, and destroy the infrastructure again.
///
/// A poll that never matches is not an error: it yields a report with
/// [`Verdict::Fail`]. Provisioning failures and a missing output are errors.
/// Teardown runs in every case unless the plan says [`Teardown::Keep`].
///
/// # Errors
///
/// Returns an error if apply, output retrieval or teardown fails.
pub async fn run_probe<P: Provisioner>(
    provisioner: &P,
    http: &impl HttpProbe,
    plan: &ProbePlan,
    reporter: &impl ProgressReporter,
    cancel: Option<&CancellationToken>,
) -> Result<ProbeReport> {
    plan.validate()?;
    let started_at = Utc::now();
    with_deployment(provisioner, reporter, plan.teardown, async |deployed: &P| {
        let value = output_required(deployed, &plan.output_key)
            .await
            .with_context(|| format!("reading output '{}'", plan.output_key))?;
        info!(key = %plan.output_key, value = %value, "resolved output");

        let check = plan.check_for(&value)?;
        reporter.step(&format!("Polling {}", check.url()));
        let result = poll_within(http, &check, reporter, cancel, plan.deadline).await;

        let mut report = build_report(&check, &result, started_at);
        report.output = Some(ResolvedOutput {
            key: plan.output_key.clone(),
            value,
        });
        Ok(report)
    })
    .await
}

/// Poll a URL directly, without provisioning anything.
pub async fn poll_url(
    http: &impl HttpProbe,
    check: &HttpCheck,
    reporter: &impl ProgressReporter,
    cancel: Option<&CancellationToken>,
    deadline: Option<Duration>,
) -> ProbeReport {
    let started_at = Utc::now();
    let result = poll_within(http, check, reporter, cancel, deadline).await;
    build_report(check, &result, started_at)
}

/// Summarise a poll result.
#[must_use]
pub fn build_report(
    check: &HttpCheck,
    result: &Result<PollSuccess, PollError>,
    started_at: DateTime<Utc>,
) -> ProbeReport {
    let (verdict, attempts, observed, message) = match result {
        Ok(success) => (
            Verdict::Pass,
            success.attempts,
            Some(ObservedResponse::response(success.status, success.body.clone())),
            None,
        ),
        Err(err) => (
            Verdict::Fail,
            err.attempts(),
            err.last_observation().map(Observation::to_observed),
            Some(err.to_string()),
        ),
    };
    ProbeReport {
        verdict,
        url: check.url().to_string(),
        attempts,
        max_attempts: check.max_attempts(),
        expected: check.expected(),
        observed,
        output: None,
        message,
        started_at,
        finished_at: Utc::now(),
    }
}
