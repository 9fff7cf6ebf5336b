//! Property-based tests for the poller's attempt counting and timing.
//!
//! Uses `proptest` to drive the poller over random budgets, intervals and
//! match positions on a paused tokio runtime.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use proptest::prelude::*;
use tfprobe_cli::application::services::poller::poll_until_match;
use tfprobe_cli::domain::{HttpCheck, PollError, validate_config_key, validate_config_value};
use tokio::time::Instant;

use crate::mocks::{RecordingReporter, ScriptedHttp, response};

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime")
}

fn check(max_attempts: u32, interval_secs: u64) -> HttpCheck {
    HttpCheck::builder("http://alb", 404, "404: page not found")
        .max_attempts(max_attempts)
        .interval(Duration::from_secs(interval_secs))
        .build()
        .expect("valid check")
}

proptest! {
    /// A match on attempt k ≤ N succeeds after exactly k requests and
    /// (k−1)×D of waiting.
    #[test]
    fn prop_match_on_attempt_k_takes_k_attempts(
        n in 1u32..15,
        k_offset in 0u32..15,
        d in 0u64..30,
    ) {
        let k = k_offset % n + 1;
        let mut script: Vec<_> = (1..k).map(|_| response(200, "hello")).collect();
        script.push(response(404, "404: page not found"));
        let http = ScriptedHttp::new(script);

        let (result, elapsed) = paused_runtime().block_on(async {
            let started = Instant::now();
            let r = poll_until_match(&http, &check(n, d), &RecordingReporter::default(), None).await;
            (r, started.elapsed())
        });

        let success = result.expect("must match");
        prop_assert_eq!(success.attempts, k);
        prop_assert_eq!(http.call_count(), k as usize);
        prop_assert_eq!(elapsed, Duration::from_secs(d * u64::from(k - 1)));
    }

    /// A response that never matches exhausts exactly N attempts after
    /// (N−1)×D of waiting.
    #[test]
    fn prop_never_matching_exhausts_exactly_n(n in 1u32..15, d in 0u64..30) {
        let http = ScriptedHttp::always(response(200, "hello"));

        let (result, elapsed) = paused_runtime().block_on(async {
            let started = Instant::now();
            let r = poll_until_match(&http, &check(n, d), &RecordingReporter::default(), None).await;
            (r, started.elapsed())
        });

        let is_exhausted = matches!(result, Err(PollError::Exhausted { attempts, .. }) if attempts == n);
        prop_assert!(is_exhausted);
        prop_assert_eq!(http.call_count(), n as usize);
        prop_assert_eq!(elapsed, Duration::from_secs(d * u64::from(n - 1)));
    }

    /// Unknown config keys are always rejected.
    #[test]
    fn prop_unknown_config_keys_rejected(key in "[a-z]{1,8}\\.[a-z_]{1,12}") {
        let known = [
            "terraform.binary",
            "terraform.apply_timeout_secs",
            "poll.max_attempts",
            "poll.interval_secs",
            "http.timeout_secs",
        ];
        prop_assume!(!known.contains(&key.as_str()));
        prop_assert!(validate_config_key(&key).is_err());
    }

    /// Any positive attempt count is a valid `poll.max_attempts`.
    #[test]
    fn prop_positive_attempts_accepted(n in 1u32..=u32::MAX) {
        prop_assert!(validate_config_value("poll.max_attempts", &n.to_string()).is_ok());
    }
}
