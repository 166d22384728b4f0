//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a fresh temp
//! directory so config files never leak between tests.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn cli(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_studypomo-cli"));
    cmd.env("HOME", home)
        .env_remove("STUDYPOMO_ENV")
        .env("RUST_LOG", "off");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(home)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

#[test]
fn test_config_list_shows_defaults() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(home.path(), &["config", "list"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["api"]["base_url"], "http://localhost:8000");
    assert_eq!(parsed["alarm"]["enabled"], true);
    assert_eq!(parsed["notifications"]["enabled"], true);
    assert_eq!(parsed["logging"]["level"], "info");
    assert!(home.path().join(".config/studypomo/config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();
    assert_eq!(
        run_cli_success(home.path(), &["config", "set", "api.base_url", "https://pomo.example.com/v1"]).trim(),
        "ok"
    );
    run_cli_success(home.path(), &["config", "set", "alarm.enabled", "false"]);

    let url = run_cli_success(home.path(), &["config", "get", "api.base_url"]);
    assert_eq!(url.trim(), "https://pomo.example.com/v1");
    let enabled = run_cli_success(home.path(), &["config", "get", "alarm.enabled"]);
    assert_eq!(enabled.trim(), "false");
}

#[test]
fn test_config_rejects_unknown_and_mistyped_values() {
    let home = TempDir::new().unwrap();

    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"), "{stderr}");

    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "alarm.enabled", "maybe"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "{stderr}");
}

#[test]
fn test_config_reset() {
    let home = TempDir::new().unwrap();
    run_cli_success(home.path(), &["config", "set", "logging.level", "debug"]);
    run_cli_success(home.path(), &["config", "reset"]);
    let level = run_cli_success(home.path(), &["config", "get", "logging.level"]);
    assert_eq!(level.trim(), "info");
}

#[test]
fn test_settings_set_validates_before_network() {
    let home = TempDir::new().unwrap();
    // Port 9 (discard) is closed; a request would fail with a connection error.
    run_cli_success(home.path(), &["config", "set", "api.base_url", "http://127.0.0.1:9"]);

    let (_, stderr, code) = run_cli(home.path(), &["settings", "set", "--study", "500"]);
    assert_eq!(code, 1);
    assert!(
        stderr.contains("Study minutes must be between 1 and 120 (got 500)"),
        "{stderr}"
    );

    let (_, stderr, code) = run_cli(home.path(), &["settings", "set", "--long-break", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Long break minutes must be between 2 and 30"), "{stderr}");
}

#[test]
fn test_settings_show_reports_unreachable_api() {
    let home = TempDir::new().unwrap();
    run_cli_success(home.path(), &["config", "set", "api.base_url", "http://127.0.0.1:9"]);
    let (_, stderr, code) = run_cli(home.path(), &["settings", "show"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "{stderr}");
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(home.path(), &["completions", "bash"]);
    assert!(out.contains("studypomo-cli"));
}

#[test]
fn test_run_prints_state_and_quits() {
    let home = TempDir::new().unwrap();
    run_cli_success(home.path(), &["config", "set", "api.base_url", "http://127.0.0.1:9"]);
    run_cli_success(home.path(), &["config", "set", "alarm.enabled", "false"]);
    run_cli_success(home.path(), &["config", "set", "notifications.enabled", "false"]);

    let mut child = cli(home.path())
        .args(["run", "--topic", "Calculus"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"status\nbogus\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first: serde_json::Value =
        serde_json::from_str(stdout.lines().next().expect("state line")).unwrap();
    assert_eq!(first["session"], "study");
    assert_eq!(first["running"], false);
    assert_eq!(first["current_remaining_seconds"], 1500);
    assert_eq!(first["cycle_count"], 0);
}
