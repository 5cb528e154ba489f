//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a fresh temporary
//! directory, so the database and config start empty.

use std::process::Command;
use std::time::Duration;

use pomodesk_core::storage::ENGINE_KEY;
use pomodesk_core::Database;
use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomodesk"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("POMODESK_ENV")
        .env_remove("POMODESK_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

/// The last JSON document on stdout (commands print the event, then state).
fn last_json(stdout: &str) -> serde_json::Value {
    let start = stdout.rfind("\n{").map_or(0, |i| i + 1);
    serde_json::from_str(&stdout[start..]).expect("JSON output")
}

#[test]
fn test_status_starts_idle_in_focus() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["timer", "status"]);
    assert_eq!(code, 0);
    let state = last_json(&stdout);
    assert_eq!(state["type"], "StateSnapshot");
    assert_eq!(state["mode"], "focus");
    assert_eq!(state["remaining_secs"], 1500);
    assert_eq!(state["running"], false);
}

#[test]
fn test_toggle_persists_between_invocations() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["timer", "start"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(&home, &["timer", "status"]);
    assert_eq!(last_json(&stdout)["running"], true);

    let (_, stdout, _) = run_cli(&home, &["timer", "pause"]);
    assert_eq!(last_json(&stdout)["running"], false);
}

#[test]
fn test_mode_switch() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["timer", "mode", "long-break"]);
    assert_eq!(code, 0);
    let state = last_json(&stdout);
    assert_eq!(state["mode"], "longBreak");
    assert_eq!(state["remaining_secs"], 15 * 60);
}

#[test]
fn test_durations_update_and_reject_invalid() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["config", "durations", "--focus", "50"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(&home, &["config", "durations"]);
    let durations = last_json(&stdout);
    assert_eq!(durations["focus"], 50);
    assert_eq!(durations["shortBreak"], 5);

    let (code, _, stderr) = run_cli(&home, &["config", "durations", "--short-break", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["config", "set", "notifications.bell", "false"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&home, &["config", "get", "notifications.bell"]);
    assert_eq!(stdout.trim(), "false");

    let (code, _, _) = run_cli(&home, &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_stats_week_has_seven_days() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["stats", "week"]);
    assert_eq!(code, 0);
    let week: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(week.as_array().map(Vec::len), Some(7));
}

#[test]
fn test_sessions_empty_log() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["stats", "sessions", "--today"]);
    assert_eq!(code, 0);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["totals"]["total_sessions"], 0);
    assert_eq!(value["sessions"].as_array().map(Vec::len), Some(0));
}

/// The raw engine snapshot stored under the temporary HOME.
fn stored_snapshot(home: &TempDir) -> Option<String> {
    let path = home.path().join(".config/pomodesk/pomodesk.db");
    Database::open_at(&path).unwrap().kv_get(ENGINE_KEY).unwrap()
}

#[test]
fn test_stats_do_not_rewrite_running_snapshot() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["timer", "start"]);
    assert_eq!(code, 0);
    let before = stored_snapshot(&home).expect("snapshot written");

    // Long enough for a catch-up to change the stored countdown.
    std::thread::sleep(Duration::from_millis(1100));
    let views: [&[&str]; 3] = [&["stats", "overview"], &["stats", "week"], &["stats", "history"]];
    for args in views {
        let (code, _, _) = run_cli(&home, args);
        assert_eq!(code, 0, "{args:?}");
    }
    assert_eq!(stored_snapshot(&home), Some(before));
}

#[test]
fn test_history_days_out_of_range_is_an_error() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["stats", "history", "--days", "200000000"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("pomodesk"));
}
