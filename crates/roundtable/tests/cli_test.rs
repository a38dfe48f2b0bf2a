//! Integration tests for the `roundtable` CLI binary.
//!
//! Validate argument parsing, help output, and shell completions -- all
//! without requiring a live server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `roundtable` binary with env isolation, so
/// tests never touch the user's real configuration.
fn roundtable_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("roundtable");
    cmd.env("HOME", "/tmp/roundtable-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/roundtable-cli-test-nonexistent")
        .env_remove("GD_SERVER")
        .env_remove("GD_TOKEN")
        .env_remove("GD_USER")
        .env_remove("GD_OUTPUT")
        .env_remove("GD_TIMEOUT");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = roundtable_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    roundtable_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("qr"))
        .stdout(predicate::str::contains("session"))
        .stdout(predicate::str::contains("survey"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_completions_bash() {
    roundtable_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("roundtable"));
}

#[test]
fn test_config_path_prints_a_path() {
    roundtable_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Missing-configuration errors ────────────────────────────────────

#[test]
fn test_qr_show_without_server_fails_with_usage_code() {
    let output = roundtable_cmd()
        .args(["qr", "show", "--venue", "venue-1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("No server configured"),
        "unexpected output:\n{text}"
    );
}

#[test]
fn test_session_status_without_user_fails() {
    let output = roundtable_cmd()
        .args([
            "session",
            "status",
            "--session",
            "sess-1",
            "--server",
            "https://gd.example.edu",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("No user id configured"),
        "unexpected output:\n{text}"
    );
}
