//! Retry-driven HTTP verification.
//!
//! Issues GET requests until the endpoint returns the expected status and
//! body, or the attempt budget runs out. Transport failures (DNS not yet
//! propagated, load balancer still warming up, malformed URL) are retried
//! like any other mismatch.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::ports::{HttpProbe, ProgressReporter};
use crate::domain::{HttpCheck, Observation, PollError};

/// A matching response and how long it took to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSuccess {
    /// Attempt number that matched (1-based).
    pub attempts: u32,
    pub status: u16,
    pub body: String,
    /// Wall time from the first request to the matching response.
    pub elapsed: Duration,
}

/// Poll `check.url()` until it satisfies `check`.
///
/// Makes at most `check.max_attempts()` requests, waiting `check.interval()`
/// between consecutive attempts and never after the last one. Returns as soon
/// as an attempt matches.
///
/// When `cancel` fires, the in-flight request or pending wait is abandoned and
/// [`PollError::Cancelled`] is returned.
///
/// # Errors
///
/// Returns [`PollError::Exhausted`] carrying the last observation when no
/// attempt matched, or [`PollError::Cancelled`].
pub async fn poll_until_match(
    http: &impl HttpProbe,
    check: &HttpCheck,
    reporter: &impl ProgressReporter,
    cancel: Option<&CancellationToken>,
) -> Result<PollSuccess, PollError> {
    let max_attempts = check.max_attempts();
    let started = Instant::now();
    let mut last: Option<Observation> = None;
    let mut attempt = 0u32;

    loop {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(cancelled(check, attempt, last));
        }
        attempt += 1;

        let request = http.get(check.url(), check.headers());
        let observation = match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => return Err(cancelled(check, attempt, last)),
                obs = request => obs,
            },
            None => request.await,
        };

        debug!(
            url = %check.url(),
            attempt,
            max_attempts,
            observed = %observation,
            "probe attempt finished"
        );

        let observation = match observation {
            Observation::Response { status, body } if check.accepts(status, &body) => {
                let elapsed = started.elapsed();
                info!(
                    url = %check.url(),
                    attempt,
                    elapsed_ms = elapsed.as_millis(),
                    "endpoint matched"
                );
                reporter.success(&format!(
                    "{} returned {status} (attempt {attempt}/{max_attempts})",
                    check.url()
                ));
                return Ok(PollSuccess {
                    attempts: attempt,
                    status,
                    body,
                    elapsed,
                });
            }
            other => other,
        };

        if attempt >= max_attempts {
            warn!(url = %check.url(), attempt, observed = %observation, "attempt budget exhausted");
            return Err(PollError::Exhausted {
                url: check.url().to_string(),
                attempts: attempt,
                expected_status: check.expected_status(),
                expected_body: check.expected_body().to_string(),
                last: observation,
            });
        }

        warn!(
            url = %check.url(),
            attempt,
            max_attempts,
            observed = %observation,
            retry_in_secs = check.interval().as_secs_f64(),
            "endpoint did not match, retrying"
        );
        reporter.step(&format!(
            "Attempt {attempt}/{max_attempts}: {observation}. Retrying in {}s",
            check.interval().as_secs()
        ));
        last = Some(observation);

        match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => return Err(cancelled(check, attempt, last)),
                () = tokio::time::sleep(check.interval()) => {}
            },
            None => tokio::time::sleep(check.interval()).await,
        }
    }
}

/// [`poll_until_match`] bounded by `deadline`, measured from the first request.
///
/// The deadline cancels a child of `cancel`, so it stops this poll without
/// firing the caller's token.
///
/// # Errors
///
/// As [`poll_until_match`]; a passed deadline yields [`PollError::Cancelled`].
pub async fn poll_within(
    http: &impl HttpProbe,
    check: &HttpCheck,
    reporter: &impl ProgressReporter,
    cancel: Option<&CancellationToken>,
    deadline: Option<Duration>,
) -> Result<PollSuccess, PollError> {
    let Some(limit) = deadline else {
        return poll_until_match(http, check, reporter, cancel).await;
    };
    let scoped = cancel.map_or_else(CancellationToken::new, CancellationToken::child_token);
    let poll = poll_until_match(http, check, reporter, Some(&scoped));
    tokio::pin!(poll);

    tokio::select! {
        biased;
        result = &mut poll => result,
        () = tokio::time::sleep(limit) => {
            warn!(url = %check.url(), deadline_secs = limit.as_secs(), "polling deadline reached");
            scoped.cancel();
            poll.await
        }
    }
}

fn cancelled(check: &HttpCheck, attempts: u32, last: Option<Observation>) -> PollError {
    warn!(url = %check.url(), attempts, "polling cancelled");
    PollError::Cancelled {
        url: check.url().to_string(),
        attempts,
        last,
    }
}
