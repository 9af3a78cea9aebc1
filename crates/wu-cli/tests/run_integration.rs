//! Integration tests for the tracking loop and query commands.
//!
//! Drives the `wu` binary with piped browser events and checks what reaches
//! stdout and the database.

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tempfile::{NamedTempFile, TempDir};

fn wu_binary() -> &'static str {
    env!("CARGO_BIN_EXE_wu")
}

/// Writes a config file pointing at a database inside `temp`.
fn config_file(temp: &TempDir) -> NamedTempFile {
    let db_path = temp.path().join("wu.db");
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, r#"database_path = "{}""#, db_path.display()).unwrap();
    writeln!(config, "checkpoint_interval_secs = 15").unwrap();
    config.flush().unwrap();
    config
}

fn seconds_for(response: &serde_json::Value, domain: &str) -> u64 {
    response["webUsageData"][domain]
        .as_object()
        .map(|days| days.values().filter_map(serde_json::Value::as_u64).sum())
        .unwrap_or(0)
}

/// Test that time in a focused tab is recorded, reported and persisted.
#[test]
fn test_run_records_focused_time() {
    let temp = TempDir::new().unwrap();
    let config = config_file(&temp);

    let mut child = Command::new(wu_binary())
        .arg("--config")
        .arg(config.path())
        .arg("run")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn wu run");

    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut line = String::new();

    // Wait for the loop to be live before timing anything
    writeln!(stdin, r#"{{"type":"query","action":"getWebUsageData"}}"#).unwrap();
    stdin.flush().unwrap();
    stdout.read_line(&mut line).unwrap();
    let initial: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(initial, serde_json::json!({"webUsageData": {}}));

    writeln!(
        stdin,
        r#"{{"type":"activated","tab_id":1,"url":"https://www.example.com/page"}}"#
    )
    .unwrap();
    stdin.flush().unwrap();
    thread::sleep(Duration::from_millis(1_500));

    writeln!(stdin, r#"{{"type":"activated","tab_id":2,"url":"chrome://newtab"}}"#).unwrap();
    writeln!(stdin, "this line is not json").unwrap();
    writeln!(stdin, r#"{{"type":"query","action":"getWebUsageData"}}"#).unwrap();
    writeln!(stdin, r#"{{"type":"suspend"}}"#).unwrap();
    stdin.flush().unwrap();
    drop(stdin);

    line.clear();
    stdout.read_line(&mut line).unwrap();
    let response: serde_json::Value = serde_json::from_str(&line).unwrap();
    let recorded = seconds_for(&response, "example.com");
    assert!(recorded >= 1, "expected at least 1s recorded: {line}");
    assert!(response["webUsageData"].get("newtab").is_none());

    let status = child.wait().unwrap();
    assert!(status.success());

    let output = Command::new(wu_binary())
        .arg("--config")
        .arg(config.path())
        .arg("query")
        .output()
        .expect("failed to run wu query");
    assert!(
        output.status.success(),
        "query failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let persisted: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(seconds_for(&persisted, "example.com"), recorded);
}

/// Test that a run over an empty event stream exits cleanly.
#[test]
fn test_run_with_empty_input_exits() {
    let temp = TempDir::new().unwrap();
    let config = config_file(&temp);

    let output = Command::new(wu_binary())
        .arg("--config")
        .arg(config.path())
        .arg("run")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run wu run");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

/// Test that report on a fresh database produces an empty day report.
#[test]
fn test_report_json_on_fresh_database() {
    let temp = TempDir::new().unwrap();
    let config = config_file(&temp);

    let output = Command::new(wu_binary())
        .arg("--config")
        .arg(config.path())
        .args(["report", "--date", "2025-01-15", "--json"])
        .output()
        .expect("failed to run wu report");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"date": "2025-01-15", "domains": [], "total_seconds": 0})
    );
}

/// Test that all subcommands are registered.
#[test]
fn test_help_lists_commands() {
    let output = Command::new(wu_binary())
        .arg("--help")
        .output()
        .expect("failed to run wu --help");

    assert!(output.status.success());
    let help_text = String::from_utf8_lossy(&output.stdout);
    for command in ["run", "report", "query", "status"] {
        assert!(
            help_text.contains(command),
            "expected '{command}' in help output: {help_text}"
        );
    }
}
