//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory
//! and inspects the JSON it prints.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomotimer"))
        .args(args)
        .env("POMOTIMER_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run and expect success; returns every JSON document printed to stdout.
fn run_json(data_dir: &Path, args: &[&str]) -> Vec<Value> {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    serde_json::Deserializer::from_str(&stdout)
        .into_iter::<Value>()
        .collect::<Result<_, _>>()
        .expect("Failed to parse JSON output")
}

fn last(docs: Vec<Value>) -> Value {
    docs.into_iter().last().expect("no JSON output")
}

#[test]
fn status_on_fresh_install() {
    let dir = tempfile::tempdir().unwrap();
    let status = last(run_json(dir.path(), &["timer", "status"]));

    assert_eq!(status["type"], "StateSnapshot");
    assert_eq!(status["state"], "Idle");
    assert_eq!(status["mode"], "Focus");
    assert_eq!(status["formatted"], "25:00");
    assert!(dir.path().join("engine.json").exists());
}

#[test]
fn focus_start_without_title_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let out = last(run_json(dir.path(), &["timer", "start"]));

    assert_eq!(out["type"], "StateSnapshot");
    assert_eq!(out["state"], "Idle");
}

#[test]
fn start_pause_resume_reset() {
    let dir = tempfile::tempdir().unwrap();

    let started = last(run_json(dir.path(), &["timer", "start", "--title", "Write report"]));
    assert_eq!(started["type"], "TimerStarted");
    assert_eq!(started["title"], "Write report");

    let status = last(run_json(dir.path(), &["timer", "status"]));
    assert_eq!(status["state"], "Running");

    let paused = last(run_json(dir.path(), &["timer", "pause"]));
    assert_eq!(paused["type"], "TimerPaused");

    let resumed = last(run_json(dir.path(), &["timer", "resume"]));
    assert_eq!(resumed["type"], "TimerResumed");

    let reset = last(run_json(dir.path(), &["timer", "reset"]));
    assert_eq!(reset["type"], "TimerReset");

    let status = last(run_json(dir.path(), &["timer", "status"]));
    assert_eq!(status["state"], "Idle");
}

#[test]
fn switch_toggles_mode() {
    let dir = tempfile::tempdir().unwrap();
    let switched = last(run_json(dir.path(), &["timer", "switch"]));
    assert_eq!(switched["type"], "ModeSwitched");
    assert_eq!(switched["to"], "Break");

    let status = last(run_json(dir.path(), &["timer", "status"]));
    assert_eq!(status["mode"], "Break");
    assert_eq!(status["formatted"], "05:00");
}

#[test]
fn overdue_interval_completes_on_next_invocation() {
    let dir = tempfile::tempdir().unwrap();
    let start = chrono::Utc::now() - chrono::Duration::hours(1);
    let snapshot = serde_json::json!({
        "mode": "Focus",
        "run_state": "Running",
        "end_at": start + chrono::Duration::seconds(1500),
        "paused_remaining_ms": null,
        "session_started_at": start,
        "focus_title": "Write report"
    });
    std::fs::write(dir.path().join("engine.json"), snapshot.to_string()).unwrap();

    let docs = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["type"], "TimerCompleted");
    assert_eq!(docs[1]["state"], "Idle");

    let history = last(run_json(dir.path(), &["history", "list"]));
    let sessions = history.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["status"], "completed");
    assert_eq!(sessions[0]["duration_seconds"], 1500);
    assert_eq!(sessions[0]["title"], "Write report");
}

#[test]
fn history_tolerates_corrupt_store() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("sessions.json"), "{{{ definitely not json").unwrap();

    let history = last(run_json(dir.path(), &["history", "list"]));
    assert_eq!(history, Value::Array(vec![]));

    let stats = last(run_json(dir.path(), &["history", "stats", "--today"]));
    assert_eq!(stats["total_sessions"], 0);
}

#[test]
fn config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.tick_interval_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "500");

    let (_, _, code) = run_cli(
        dir.path(),
        &["config", "set", "timer.abandon_threshold_secs", "10"],
    );
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timer.abandon_threshold_secs"]);
    assert_eq!(stdout.trim(), "10");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "timer.focus_duration", "30"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn unreadable_config_is_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut bytes = b"[timer]\nabandon_threshold_secs = 30\n# caf".to_vec();
    bytes.push(0xE9);
    bytes.push(b'\n');
    std::fs::write(&path, &bytes).unwrap();

    let (stdout, stderr, code) =
        run_cli(dir.path(), &["config", "get", "timer.abandon_threshold_secs"]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("error:"));

    // Timer commands fall back to defaults without touching the file.
    let status = last(run_json(dir.path(), &["timer", "status"]));
    assert_eq!(status["state"], "Idle");
    assert_eq!(std::fs::read(&path).unwrap(), bytes);
}
