//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway data directory and check
//! its JSON output. Each invocation is a fresh process, so every test also
//! exercises recovery from the on-disk snapshot.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::Value;
use studytimer_core::{Database, PhaseEngine, SessionStore};

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_studytimer-cli"))
        .args(args)
        .env("STUDYTIMER_DATA_DIR", data_dir)
        .env_remove("STUDYTIMER_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

/// Plant a running session that began `ago_ms` before now.
fn plant_session(data_dir: &Path, study_ms: u64, break_ms: u64, ago_ms: u64) {
    let db = Database::open_at(&data_dir.join("studytimer.db")).unwrap();
    let engine = PhaseEngine::start(study_ms, break_ms, studytimer_core::now_ms() - ago_ms);
    SessionStore::new(&db).save(engine.state()).unwrap();
}

#[test]
fn test_status_without_session() {
    let dir = tempfile::tempdir().unwrap();
    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["running"], false);
    assert!(status.get("phase").is_none());
}

#[test]
fn test_start_then_status_across_processes() {
    let dir = tempfile::tempdir().unwrap();
    let started = run_json(dir.path(), &["start", "--study", "25", "--break", "5"]);
    assert_eq!(started["running"], true);
    assert_eq!(started["phase"], "studying");
    assert_eq!(started["remaining"], "25:00");
    assert_eq!(started["cycle"], 1);

    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["running"], true);
    assert_eq!(status["phase"], "studying");
    assert_eq!(status["status"], "DEEP WORKING");
    assert_eq!(status["skip_available"], false);
    assert!(status["remaining_secs"].as_u64().unwrap() > 24 * 60);
}

#[test]
fn test_start_rejects_zero_and_double_start() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["start", "--study", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    run_json(dir.path(), &["start"]);
    let (code, _, stderr) = run_cli(dir.path(), &["start"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("already running"), "{stderr}");
}

#[test]
fn test_skip_only_in_delay() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["skip"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("No study session is running"), "{stderr}");

    run_json(dir.path(), &["start"]);
    let result = run_json(dir.path(), &["skip"]);
    assert_eq!(result["skipped"], false);
    assert_eq!(result["phase"], "studying");
}

#[test]
fn test_recovered_delay_can_be_skipped() {
    let dir = tempfile::tempdir().unwrap();
    // Study ended 30 s ago; the one-minute cue is half over.
    plant_session(dir.path(), 25 * 60_000, 5 * 60_000, 25 * 60_000 + 30_000);

    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["phase"], "post_study_delay");
    assert_eq!(status["skip_available"], true);

    let result = run_json(dir.path(), &["skip"]);
    assert_eq!(result["skipped"], true);
    assert_eq!(result["phase"], "on_break");
    assert_eq!(result["cycle"], 1);
}

#[test]
fn test_stop_credits_today() {
    let dir = tempfile::tempdir().unwrap();
    // A full study period is behind us.
    plant_session(dir.path(), 25 * 60_000, 5 * 60_000, 26 * 60_000 + 30_000);

    let summary = run_json(dir.path(), &["stop"]);
    assert_eq!(summary["study_secs"], 25 * 60);
    assert_eq!(summary["studied"], "25m");
    assert_eq!(summary["today_minutes"], 25);

    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["running"], false);

    let today = run_json(dir.path(), &["today"]);
    assert_eq!(today["minutes"], 25);
    assert_eq!(today["today"], "0h 25m");

    let (code, _, _) = run_cli(dir.path(), &["stop"]);
    assert_ne!(code, 0);
}

#[test]
fn test_corrupt_snapshot_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    {
        use studytimer_core::KvStore;
        let db = Database::open_at(&dir.path().join("studytimer.db")).unwrap();
        db.set("study_timer.active_session", "{not json").unwrap();
    }
    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["running"], false);
    run_json(dir.path(), &["start"]);
}

#[test]
fn test_config_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "timer.study_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "timer.study_minutes", "40"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "timer.study_minutes"]);
    assert_eq!(stdout.trim(), "40");

    let list = run_json(dir.path(), &["config", "list"]);
    assert_eq!(list["timer"]["study_minutes"], 40);
    assert_eq!(list["host"]["tick_interval_ms"], 1000);

    // Defaults for `start` come from the config.
    let started = run_json(dir.path(), &["start"]);
    assert_eq!(started["remaining"], "40:00");

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "timer.nope"]);
    assert_ne!(code, 0);
    let (code, _, _) = run_cli(dir.path(), &["config", "set", "timer.study_minutes", "soon"]);
    assert_ne!(code, 0);

    let (code, _, _) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "timer.study_minutes"]);
    assert_eq!(stdout.trim(), "25");
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("studytimer-cli"));
}

#[test]
fn test_run_quits_on_q() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "notifications.enabled", "false"]);
    run_cli(dir.path(), &["config", "set", "audio.enabled", "false"]);

    let mut child = Command::new(env!("CARGO_BIN_EXE_studytimer-cli"))
        .args(["run", "--study", "25", "--break", "5"])
        .env("STUDYTIMER_DATA_DIR", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child.stdin.take().unwrap().write_all(b"s\nq\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let summary: Value = serde_json::from_str(stdout.lines().last().unwrap()).unwrap();
    assert_eq!(summary["cycles"], 1);
    assert_eq!(summary["today_minutes"], 0);

    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["running"], false);
}

fn spawn_run(data_dir: &Path, args: &[&str]) -> std::process::Child {
    run_cli(data_dir, &["config", "set", "notifications.enabled", "false"]);
    run_cli(data_dir, &["config", "set", "audio.enabled", "false"]);
    Command::new(env!("CARGO_BIN_EXE_studytimer-cli"))
        .arg("run")
        .args(args)
        .env("STUDYTIMER_DATA_DIR", data_dir)
        .env_remove("STUDYTIMER_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI")
}

#[test]
fn test_stop_beside_run_credits_once() {
    let dir = tempfile::tempdir().unwrap();
    plant_session(dir.path(), 25 * 60_000, 5 * 60_000, 26 * 60_000);

    let mut child = spawn_run(dir.path(), &[]);
    std::thread::sleep(std::time::Duration::from_millis(1500));

    let summary = run_json(dir.path(), &["stop"]);
    assert_eq!(summary["today_minutes"], 25);

    // The loop may already have exited on its own; a closed pipe is fine.
    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(b"q\n");
    }
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("today_minutes"), "{stdout}");

    let today = run_json(dir.path(), &["today"]);
    assert_eq!(today["minutes"], 25);
    let status = run_json(dir.path(), &["status"]);
    assert_eq!(status["running"], false);
}

#[test]
fn test_run_warns_when_flags_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    plant_session(dir.path(), 25 * 60_000, 5 * 60_000, 60_000);

    let mut child = spawn_run(dir.path(), &["--study", "50"]);
    child.stdin.take().unwrap().write_all(b"q\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--study/--break ignored"), "{stderr}");
}
