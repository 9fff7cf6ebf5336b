//! Integration tests for `tfprobe config` command.
//!
//! All filesystem-touching tests set `TFPROBE_CONFIG` to a temp path so they
//! never read or write `~/.tfprobe/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tfprobe() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tfprobe"));
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

#[test]
fn test_config_help_lists_subcommands() {
    tfprobe()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("path"));
}

#[test]
fn test_config_show_without_file_uses_defaults() {
    let (_dir, path) = temp_config_path();
    tfprobe()
        .args(["config", "show"])
        .env("TFPROBE_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("terraform.binary:"))
        .stdout(predicate::str::contains("terraform"))
        .stdout(predicate::str::contains("poll.max_attempts:"))
        .stdout(predicate::str::contains("10"));
}

#[test]
fn test_config_set_then_get_round_trips_through_file() {
    let (_dir, path) = temp_config_path();
    tfprobe()
        .args(["config", "set", "terraform.binary", "tofu"])
        .env("TFPROBE_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Set terraform.binary = tofu"));

    tfprobe()
        .args(["config", "get", "terraform.binary"])
        .env("TFPROBE_CONFIG", &path)
        .assert()
        .success()
        .stdout("tofu\n");

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("binary: tofu"), "got: {content}");
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let (_dir, path) = temp_config_path();
    tfprobe()
        .args(["config", "set", "poll.jitter", "1"])
        .env("TFPROBE_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("poll.jitter"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_rejects_zero_attempts() {
    let (_dir, path) = temp_config_path();
    tfprobe()
        .args(["config", "set", "poll.max_attempts", "0"])
        .env("TFPROBE_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn test_config_path_prints_override() {
    let (_dir, path) = temp_config_path();
    tfprobe()
        .args(["config", "path"])
        .env("TFPROBE_CONFIG", &path)
        .assert()
        .success()
        .stdout(format!("{path}\n"));
}

#[test]
fn test_config_show_json() {
    let (_dir, path) = temp_config_path();
    let output = tfprobe()
        .args(["config", "show", "--json"])
        .env("TFPROBE_CONFIG", &path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["path"], path.as_str());
    assert_eq!(value["config"]["poll"]["interval_secs"], 10);
    assert_eq!(value["config"]["http"]["timeout_secs"], 10);
}

#[test]
fn test_config_errors_are_json_objects_in_json_mode() {
    let (_dir, path) = temp_config_path();
    let output = tfprobe()
        .args(["config", "get", "nope", "--json"])
        .env("TFPROBE_CONFIG", &path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "INVALID_CONFIG");
}

#[test]
fn test_hand_edited_invalid_value_is_rejected_but_repairable() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "poll:\n  max_attempts: 0\n").unwrap();

    tfprobe()
        .args([
            "--json", "poll", "http://127.0.0.1:9", "--status", "200", "--body", "ok",
        ])
        .env("TFPROBE_CONFIG", &path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID_CONFIG"))
        .stdout(predicate::str::contains("poll.max_attempts"));

    tfprobe()
        .args(["config", "set", "poll.max_attempts", "3"])
        .env("TFPROBE_CONFIG", &path)
        .assert()
        .success();

    tfprobe()
        .args(["config", "get", "poll.max_attempts"])
        .env("TFPROBE_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));
}
