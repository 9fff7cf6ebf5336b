//! Structural tests for layer boundary enforcement.
//!
//! These scan source files to check that the domain stays pure and that
//! services only reach infrastructure through ports.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Read a file and strip comment lines to avoid false positives.
fn read_non_comment_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(String::from)
        .collect()
}

/// Report every line under `dir` containing one of `forbidden`.
fn find_violations(dir: &Path, forbidden: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            for pattern in forbidden {
                if line.contains(pattern) {
                    violations.push(format!("{rel}:{}: `{pattern}`: {line}", i + 1));
                }
            }
        }
    }
    violations
}

fn src(sub: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(sub)
}

#[test]
fn domain_has_no_io_or_outer_layer_imports() {
    let violations = find_violations(
        &src("domain"),
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "tokio::",
            "std::fs",
            "std::process",
            "std::net",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay pure:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_reaches_infra_only_through_ports() {
    let violations = find_violations(
        &src("application"),
        &["crate::infra", "crate::commands", "crate::output", "reqwest::"],
    );
    assert!(
        violations.is_empty(),
        "application/ must depend on ports, not adapters:\n{}",
        violations.join("\n")
    );
}

#[test]
fn no_tokio_command_runner_new_outside_infra() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let violations: Vec<String> = find_violations(&src_dir, &["TokioCommandRunner::new"])
        .into_iter()
        .filter(|v| !v.replace('\\', "/").contains("/infra/"))
        .collect();
    assert!(
        violations.is_empty(),
        "TokioCommandRunner::new outside infra/, go through TerraformProvisioner:\n{}",
        violations.join("\n")
    );
}

#[test]
fn no_inline_json_branching_in_commands() {
    let violations = find_violations(&src("commands"), &["json: bool", "if json", "if !json"])
        .into_iter()
        .filter(|v| !v.contains("version.rs"))
        .collect::<Vec<_>>();
    assert!(
        violations.is_empty(),
        "Found inline JSON branching in commands/, use app.renderer() instead:\n{}",
        violations.join("\n")
    );
}
