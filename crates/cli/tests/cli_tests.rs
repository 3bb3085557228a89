//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "drc-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("--namespace"),
        "Should show namespace option"
    );
    assert!(
        stdout.contains("--deployment"),
        "Should show deployment option"
    );
    assert!(
        stdout.contains("--check-only"),
        "Should show check-only option"
    );
    assert!(stdout.contains("--revision"), "Should show revision option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "drc-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("drc"), "Should show binary name");
}

/// Test that the monitoring tunables are exposed
#[test]
fn test_monitor_tunables_in_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "drc-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stdout.contains("--max-retries"),
        "Should show max-retries option"
    );
    assert!(
        stdout.contains("--retry-interval"),
        "Should show retry-interval option"
    );
    assert!(
        stdout.contains("--threshold"),
        "Should show threshold option"
    );
    assert!(
        stdout.contains("--probe-timeout"),
        "Should show probe-timeout option"
    );
}

/// Test that the webhook can come from the environment
#[test]
fn test_webhook_env_in_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "drc-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stdout.contains("--webhook-url"),
        "Should show webhook-url option"
    );
    assert!(
        stdout.contains("SLACK_WEBHOOK_URL"),
        "Should show env var"
    );
}

/// Test missing required argument error handling
#[test]
fn test_missing_deployment() {
    let output = Command::new("cargo")
        .args(["run", "-p", "drc-cli", "--"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Missing argument should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("required") || stderr.contains("error"),
        "Should show error about missing argument"
    );
}
