//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;
use tfprobe_common::{ObservedResponse, ProbeReport, Verdict};

use crate::domain::check::preview;
use crate::domain::config::TfprobeConfig;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the outcome of a probe.
    ///
    /// A failing verdict is printed even in quiet mode.
    pub fn render_report(&self, report: &ProbeReport) {
        match report.verdict {
            Verdict::Pass => {
                self.ctx.success(&format!(
                    "PASS {} returned {} after {}",
                    report.url,
                    report.expected.status,
                    attempts_phrase(report.attempts)
                ));
            }
            Verdict::Fail => {
                self.ctx.error(&format!(
                    "FAIL {} after {} of {}",
                    report.url,
                    attempts_phrase(report.attempts),
                    report.max_attempts
                ));
                if self.ctx.quiet {
                    return;
                }
                self.ctx.kv(
                    "expected:",
                    &format!(
                        "status {} body {} ({})",
                        report.expected.status,
                        preview(&report.expected.body),
                        report.expected.body_match
                    ),
                );
                if let Some(observed) = &report.observed {
                    self.ctx.kv("observed:", &describe_observed(observed));
                }
            }
        }
        if let Some(output) = &report.output {
            self.ctx.kv("output:", &format!("{} = {}", output.key, output.value));
        }
    }

    /// Render the effective configuration.
    pub fn render_config(&self, config: &TfprobeConfig, path: &std::path::Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<32} {}", "terraform.binary:", config.terraform.binary);
        println!(
            "  {:<32} {}",
            "terraform.apply_timeout_secs:", config.terraform.apply_timeout_secs
        );
        println!("  {:<32} {}", "poll.max_attempts:", config.poll.max_attempts);
        println!("  {:<32} {}", "poll.interval_secs:", config.poll.interval_secs);
        println!("  {:<32} {}", "http.timeout_secs:", config.http.timeout_secs);
        println!();
    }
}

#[must_use]
pub fn attempts_phrase(attempts: u32) -> String {
    let noun = if attempts == 1 { "attempt" } else { "attempts" };
    format!("{attempts} {noun}")
}

#[must_use]
pub fn describe_observed(observed: &ObservedResponse) -> String {
    match (&observed.error, observed.status) {
        (Some(err), _) => format!("transport error: {err}"),
        (None, Some(status)) => format!(
            "status {status} body {}",
            preview(observed.body.as_deref().unwrap_or_default())
        ),
        (None, None) => "nothing".to_string(),
    }
}
