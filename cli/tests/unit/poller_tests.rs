//! Timing and termination tests for `poll_until_match` and `poll_within`.
//!
//! All tests run on paused tokio time: sleeps complete instantly and
//! `Instant::elapsed()` reports the virtual time spent waiting.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use tfprobe_cli::application::services::poller::{poll_until_match, poll_within};
use tfprobe_cli::domain::{HttpCheck, Observation, PollError};
use tfprobe_common::BodyMatch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::mocks::{RecordingReporter, ScriptedHttp, response};

const NOT_FOUND: &str = "404: page not found";

fn alb_check() -> HttpCheck {
    HttpCheck::builder("http://alb-1.elb.amazonaws.com", 404, NOT_FOUND)
        .max_attempts(10)
        .interval(Duration::from_secs(10))
        .build()
        .expect("valid check")
}

#[tokio::test(start_paused = true)]
async fn test_match_on_third_attempt_succeeds_after_three_attempts() {
    let http = ScriptedHttp::new([
        Observation::Transport("dns error: no such host".to_string()),
        response(503, "warming up"),
        response(404, NOT_FOUND),
    ]);
    let reporter = RecordingReporter::default();
    let started = Instant::now();

    let success = poll_until_match(&http, &alb_check(), &reporter, None)
        .await
        .expect("should match");

    assert_eq!(success.attempts, 3);
    assert_eq!(success.status, 404);
    assert_eq!(success.body, NOT_FOUND);
    assert_eq!(http.call_count(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(20));
    assert!(success.elapsed <= Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn test_match_on_first_attempt_does_not_wait() {
    let http = ScriptedHttp::always(response(404, NOT_FOUND));
    let started = Instant::now();

    let success = poll_until_match(&http, &alb_check(), &RecordingReporter::default(), None)
        .await
        .unwrap();

    assert_eq!(success.attempts, 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_never_matching_fails_after_exactly_max_attempts() {
    let http = ScriptedHttp::always(response(200, "hello"));
    let started = Instant::now();

    let err = poll_until_match(&http, &alb_check(), &RecordingReporter::default(), None)
        .await
        .unwrap_err();

    assert_eq!(http.call_count(), 10);
    // Nine waits between ten attempts; none after the last.
    assert_eq!(started.elapsed(), Duration::from_secs(90));
    match err {
        PollError::Exhausted {
            attempts,
            expected_status,
            last,
            ..
        } => {
            assert_eq!(attempts, 10);
            assert_eq!(expected_status, 404);
            assert_eq!(last.status(), Some(200));
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_message_reports_expected_and_observed() {
    let http = ScriptedHttp::always(response(200, "hello"));
    let err = poll_until_match(&http, &alb_check(), &RecordingReporter::default(), None)
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("404"), "got: {msg}");
    assert!(msg.contains(NOT_FOUND), "got: {msg}");
    assert!(msg.contains("status 200"), "got: {msg}");
    assert!(msg.contains("10 attempts"), "got: {msg}");
}

#[tokio::test(start_paused = true)]
async fn test_transport_errors_are_retried_until_budget_exhausted() {
    let http = ScriptedHttp::always(Observation::Transport("connection refused".to_string()));
    let check = HttpCheck::builder("http://127.0.0.1:9", 200, "ok")
        .max_attempts(3)
        .interval(Duration::from_secs(1))
        .build()
        .unwrap();

    let err = poll_until_match(&http, &check, &RecordingReporter::default(), None)
        .await
        .unwrap_err();

    assert_eq!(http.call_count(), 3);
    assert_eq!(
        err.last_observation(),
        Some(&Observation::Transport("connection refused".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_body_comparison_is_exact_by_default() {
    let http = ScriptedHttp::always(response(404, "404: page not found\n"));
    let check = HttpCheck::builder("http://alb", 404, NOT_FOUND)
        .max_attempts(2)
        .interval(Duration::ZERO)
        .build()
        .unwrap();

    let result = poll_until_match(&http, &check, &RecordingReporter::default(), None).await;
    assert!(result.is_err(), "trailing newline must not match exactly");
}

#[tokio::test(start_paused = true)]
async fn test_contains_mode_accepts_body_containing_expected_text() {
    let http = ScriptedHttp::always(response(404, "<h1>404: page not found</h1>"));
    let check = HttpCheck::builder("http://alb", 404, NOT_FOUND)
        .body_match(BodyMatch::Contains)
        .max_attempts(1)
        .build()
        .unwrap();

    let success = poll_until_match(&http, &check, &RecordingReporter::default(), None)
        .await
        .unwrap();
    assert_eq!(success.attempts, 1);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_status_with_right_body_is_retried() {
    let http = ScriptedHttp::new([response(500, NOT_FOUND), response(404, NOT_FOUND)]);
    let success = poll_until_match(&http, &alb_check(), &RecordingReporter::default(), None)
        .await
        .unwrap();
    assert_eq!(success.attempts, 2);
}

#[tokio::test(start_paused = true)]
async fn test_headers_are_sent_on_every_attempt() {
    let http = ScriptedHttp::new([response(503, ""), response(404, NOT_FOUND)]);
    let check = HttpCheck::builder("http://alb", 404, NOT_FOUND)
        .header("Host", "app.example.com")
        .build()
        .unwrap();

    poll_until_match(&http, &check, &RecordingReporter::default(), None)
        .await
        .unwrap();

    for (url, headers) in http.calls() {
        assert_eq!(url, "http://alb");
        assert_eq!(
            headers,
            vec![("Host".to_string(), "app.example.com".to_string())]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_retries_are_reported_as_steps() {
    let http = ScriptedHttp::new([response(503, "warming up"), response(404, NOT_FOUND)]);
    let reporter = RecordingReporter::default();

    poll_until_match(&http, &alb_check(), &reporter, None)
        .await
        .unwrap();

    let messages = reporter.messages();
    assert!(
        messages
            .iter()
            .any(|m| m.starts_with("step: Attempt 1/10") && m.contains("503")),
        "got: {messages:?}"
    );
    assert!(
        messages.last().is_some_and(|m| m.starts_with("success:")),
        "got: {messages:?}"
    );
}

// ── Cancellation ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_start_makes_no_request() {
    let http = ScriptedHttp::always(response(404, NOT_FOUND));
    let token = CancellationToken::new();
    token.cancel();

    let err = poll_until_match(&http, &alb_check(), &RecordingReporter::default(), Some(&token))
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Cancelled { attempts: 0, last: None, .. }));
    assert_eq!(http.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_the_wait_between_attempts() {
    let http = ScriptedHttp::always(response(200, "hello"));
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(25)).await;
        canceller.cancel();
    });
    let started = Instant::now();

    let err = poll_until_match(&http, &alb_check(), &RecordingReporter::default(), Some(&token))
        .await
        .unwrap_err();

    // Attempts at t=0, 10, 20; cancelled during the third wait.
    assert_eq!(http.call_count(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(25));
    match err {
        PollError::Cancelled { attempts, last, .. } => {
            assert_eq!(attempts, 3);
            assert_eq!(last.and_then(|o| o.status()), Some(200));
        }
        other => panic!("expected Cancelled, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_abandons_in_flight_request() {
    let http = ScriptedHttp::always(response(404, NOT_FOUND)).with_latency(Duration::from_secs(60));
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        canceller.cancel();
    });

    let err = poll_until_match(&http, &alb_check(), &RecordingReporter::default(), Some(&token))
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::Cancelled { attempts: 1, last: None, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_without_caller_token_stops_polling() {
    let http = ScriptedHttp::always(response(200, "hello"));
    let started = Instant::now();

    let err = poll_within(
        &http,
        &alb_check(),
        &RecordingReporter::default(),
        None,
        Some(Duration::from_secs(15)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PollError::Cancelled { attempts: 2, .. }), "got: {err:?}");
    assert_eq!(started.elapsed(), Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_longer_than_budget_changes_nothing() {
    let http = ScriptedHttp::always(response(200, "hello"));

    let err = poll_within(
        &http,
        &alb_check(),
        &RecordingReporter::default(),
        None,
        Some(Duration::from_secs(3600)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PollError::Exhausted { attempts: 10, .. }), "got: {err:?}");
}
