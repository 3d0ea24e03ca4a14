//! E2E CLI tests covering the main flow:
//! - `gv init` creates the project structure
//! - `gv task add` / `gv user add` populate the store
//! - `gv complete` settles points; a duplicate in the same window is rejected
//! - `gv log`, `gv top`, and `gv stats` read the results back
//!
//! Each test runs the `gv` binary as a subprocess in an isolated temp
//! directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// Build a Command targeting the gv binary, rooted in `dir`.
fn gv_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gv"));
    cmd.current_dir(dir);
    cmd.env("GROVE_LOG", "error");
    cmd
}

fn init_project(dir: &Path) {
    gv_cmd(dir).args(["init"]).assert().success();
}

fn add_task(dir: &Path, title: &str, cadence: &str, points: &str) -> String {
    let output = gv_cmd(dir)
        .args([
            "task",
            "add",
            "--title",
            title,
            "--description",
            "A repeating sustainability habit for tests.",
            "--cadence",
            cadence,
            "--category",
            "environment",
            "--difficulty",
            "easy",
            "--points",
            points,
            "--json",
        ])
        .output()
        .expect("task add should not crash");
    assert!(
        output.status.success(),
        "task add failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    json["id"].as_str().expect("id field").to_string()
}

fn add_user(dir: &Path, name: &str, email: &str) -> String {
    let output = gv_cmd(dir)
        .args(["user", "add", "--name", name, "--email", email, "--json"])
        .output()
        .expect("user add should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    json["id"].as_str().expect("id field").to_string()
}

#[test]
fn init_creates_project_structure() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());

    assert!(dir.path().join(".grove/grove.db").is_file());
    assert!(dir.path().join(".grove/config.toml").is_file());

    // Re-init without --force must fail.
    gv_cmd(dir.path()).args(["init"]).assert().failure();
}

#[test]
fn commands_before_init_report_not_initialized() {
    let dir = TempDir::new().expect("temp dir");
    gv_cmd(dir.path())
        .args(["task", "list", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
}

#[test]
fn complete_settles_points_and_rejects_duplicates() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());

    let task = add_task(dir.path(), "Cycle to work", "daily", "25");
    let user = add_user(dir.path(), "Ada", "ada@example.org");

    gv_cmd(dir.path())
        .args([
            "complete",
            "--task",
            &task,
            "--user",
            &user,
            "--at",
            "2024-03-11T08:00:00Z",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"points_earned\": 25"));

    // Same window: rejected with the daily message and the stable code.
    gv_cmd(dir.path())
        .args([
            "complete",
            "--task",
            &task,
            "--user",
            &user,
            "--at",
            "2024-03-11T21:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3001"))
        .stderr(predicate::str::contains("tomorrow"));

    // Next day: accepted again.
    gv_cmd(dir.path())
        .args([
            "complete",
            "--task",
            &task,
            "--user",
            &user,
            "--at",
            "2024-03-12T08:00:00Z",
            "--json",
        ])
        .assert()
        .success();

    let output = gv_cmd(dir.path())
        .args(["user", "show", &user, "--json"])
        .output()
        .expect("user show should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["points"].as_i64(), Some(50));
}

#[test]
fn log_and_stats_reflect_the_feed() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());

    let task = add_task(dir.path(), "Beach cleanup", "weekly", "50");
    let user = add_user(dir.path(), "Grace", "grace@example.org");

    gv_cmd(dir.path())
        .args([
            "complete",
            "--task",
            &task,
            "--user",
            &user,
            "--at",
            "2024-03-13T09:00:00Z",
            "--json",
        ])
        .assert()
        .success();

    let output = gv_cmd(dir.path())
        .args(["log", "--user", &user, "--json"])
        .output()
        .expect("log should not crash");
    assert!(output.status.success());
    let feed: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let entries = feed.as_array().expect("feed is an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["task"]["title"].as_str(), Some("Beach cleanup"));
    assert_eq!(entries[0]["points_earned"].as_u64(), Some(50));

    let output = gv_cmd(dir.path())
        .args(["stats", "--user", &user, "--json"])
        .output()
        .expect("stats should not crash");
    assert!(output.status.success());
    let stats: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(stats["total_completions"].as_u64(), Some(1));
    assert_eq!(stats["total_points_earned"].as_i64(), Some(50));
}

#[test]
fn group_flow_attributes_points_to_the_leaderboard() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());

    let task = add_task(dir.path(), "Campus audit", "monthly", "100");
    let founder = add_user(dir.path(), "Ada", "ada@example.org");

    let output = gv_cmd(dir.path())
        .args([
            "group",
            "add",
            "--name",
            "Green Campus",
            "--kind",
            "university",
            "--founder",
            &founder,
            "--json",
        ])
        .output()
        .expect("group add should not crash");
    assert!(
        output.status.success(),
        "group add failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let group = json["id"].as_str().expect("id field").to_string();

    gv_cmd(dir.path())
        .args([
            "complete",
            "--task",
            &task,
            "--user",
            &founder,
            "--group",
            &group,
            "--at",
            "2024-12-15T10:00:00Z",
            "--json",
        ])
        .assert()
        .success();

    let output = gv_cmd(dir.path())
        .args(["top", "groups", "--json"])
        .output()
        .expect("top should not crash");
    assert!(output.status.success());
    let board: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let entries = board.as_array().expect("board is an array");
    assert_eq!(entries[0]["id"].as_str(), Some(group.as_str()));
    assert_eq!(entries[0]["points"].as_i64(), Some(100));
}

#[test]
fn invalid_enum_values_report_a_stable_code() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());

    gv_cmd(dir.path())
        .args([
            "task",
            "add",
            "--title",
            "Bad cadence",
            "--description",
            "This draft uses an unknown cadence value.",
            "--cadence",
            "fortnightly",
            "--category",
            "environment",
            "--difficulty",
            "easy",
            "--points",
            "10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2005"));
}

#[test]
fn task_import_is_all_or_nothing() {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());

    let good = serde_json::json!([
        {
            "title": "First habit",
            "description": "A repeating sustainability habit for tests.",
            "cadence": "daily",
            "category": "environment",
            "difficulty": "easy",
            "points": 10
        },
        {
            "title": "Second habit",
            "description": "A repeating sustainability habit for tests.",
            "cadence": "weekly",
            "category": "health",
            "difficulty": "medium",
            "points": 40
        }
    ]);
    let file = dir.path().join("tasks.json");
    std::fs::write(&file, serde_json::to_vec(&good).expect("serialize")).expect("write file");

    gv_cmd(dir.path())
        .args(["task", "import", "--file", file.to_str().expect("utf8 path"), "--json"])
        .assert()
        .success();

    let output = gv_cmd(dir.path())
        .args(["task", "list", "--json"])
        .output()
        .expect("task list should not crash");
    let list: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(list.as_array().expect("array").len(), 2);

    // One invalid draft poisons the whole batch.
    let bad = serde_json::json!([
        {
            "title": "Broken habit",
            "description": "Points are outside the allowed range.",
            "cadence": "daily",
            "category": "other",
            "difficulty": "easy",
            "points": 5000
        }
    ]);
    std::fs::write(&file, serde_json::to_vec(&bad).expect("serialize")).expect("write file");
    gv_cmd(dir.path())
        .args(["task", "import", "--file", file.to_str().expect("utf8 path")])
        .assert()
        .failure();

    let output = gv_cmd(dir.path())
        .args(["task", "list", "--json"])
        .output()
        .expect("task list should not crash");
    let list: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(list.as_array().expect("array").len(), 2, "batch must not partially land");
}
