//! Integration tests for the `sw` binary
//!
//! Each test builds a throwaway project directory, drives the binary the way
//! a user would, and checks exit status, output, and database state.

use std::fs;
use std::path::Path;
use std::process::Command;
use sw_db::{Datasource, DuckDbBackend};
use tempfile::TempDir;

/// Path to the compiled sw binary
fn sw_bin() -> String {
    env!("CARGO_BIN_EXE_sw").to_string()
}

/// Run an `sw` command in `project` and return (stdout, stderr, success).
fn run_sw(project: &Path, args: &[&str]) -> (String, String, bool) {
    run_sw_with_env(project, args, None)
}

fn run_sw_with_env(project: &Path, args: &[&str], connection_env: Option<&str>) -> (String, String, bool) {
    let mut cmd = Command::new(sw_bin());
    cmd.arg("--project-dir").arg(project).args(args);
    cmd.env_remove("SW_CONNECTION").env_remove("RUST_LOG");
    if let Some(conn) = connection_env {
        cmd.env("SW_CONNECTION", conn);
    }
    let output = cmd
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute sw with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("stepwise.yml"),
        r#"
name: cli_test
connections:
  default:
    type: duckdb
    path: app.duckdb
  audit:
    type: duckdb
    path: audit.duckdb
    prefix: audit_
"#,
    )
    .unwrap();
    let migrations = dir.path().join("migrations");
    fs::create_dir_all(&migrations).unwrap();
    fs::write(
        migrations.join("20240101000000-CreateUsers.sql"),
        "-- upgrade\nCREATE TABLE users (id INTEGER);\n-- downgrade\nDROP TABLE users;\n",
    )
    .unwrap();
    fs::write(
        migrations.join("20240102000000-SeedUsers.sql"),
        "-- upgrade\nINSERT INTO users VALUES (1);\n",
    )
    .unwrap();
    dir
}

fn count(db_path: &Path, sql: &str) -> String {
    DuckDbBackend::from_path(db_path)
        .unwrap()
        .query_one(sql)
        .unwrap()
        .unwrap()
}

// ── Commands ───────────────────────────────────────────────────────────

#[test]
fn test_upgrade_all_then_status() {
    let project = project();

    let (stdout, stderr, ok) = run_sw(project.path(), &["upgrade-all"]);
    assert!(ok, "upgrade-all failed: {stderr}");
    assert!(stdout.contains("Applied 2 migrations"), "stdout: {stdout}");

    let (stdout, _, ok) = run_sw(project.path(), &["upgrade-all"]);
    assert!(ok);
    assert!(stdout.contains("already up to date"), "stdout: {stdout}");

    let (stdout, _, ok) = run_sw(project.path(), &["status"]);
    assert!(ok);
    assert!(stdout.contains("2 applied, 0 pending, 0 skipped"), "stdout: {stdout}");
    assert_eq!(count(&project.path().join("app.duckdb"), "SELECT COUNT(*) FROM users"), "1");
}

#[test]
fn test_run_single_migration() {
    let project = project();

    let (stdout, stderr, ok) = run_sw(project.path(), &["run", "20240101000000"]);
    assert!(ok, "run failed: {stderr}");
    assert!(stdout.contains("Applied 20240101000000-CreateUsers.sql"), "stdout: {stdout}");

    let (stdout, _, ok) = run_sw(project.path(), &["run", "20240101000000"]);
    assert!(ok);
    assert!(stdout.contains("already been applied"), "stdout: {stdout}");
}

#[test]
fn test_failures_exit_non_zero() {
    let project = project();

    let (_, stderr, ok) = run_sw(project.path(), &["run", "20990101000000"]);
    assert!(!ok);
    assert!(stderr.contains("[R001]"), "stderr: {stderr}");

    let (_, stderr, ok) = run_sw(project.path(), &["run", "not-an-id"]);
    assert!(!ok);
    assert!(stderr.contains("Invalid migration id"), "stderr: {stderr}");

    let (_, _, ok) = run_sw(project.path(), &["status", "--connection", "nope"]);
    assert!(!ok);
}

#[test]
fn test_create_then_upgrade() {
    let project = project();

    let (stdout, stderr, ok) = run_sw(project.path(), &["create", "AddEmail"]);
    assert!(ok, "create failed: {stderr}");
    assert!(stdout.contains("-AddEmail.sql"), "stdout: {stdout}");
    assert!(!project.path().join("app.duckdb").exists());

    let (_, stderr, ok) = run_sw(project.path(), &["create", "AddEmail"]);
    assert!(!ok);
    assert!(stderr.contains("[E101]"), "stderr: {stderr}");

    let (stdout, _, ok) = run_sw(project.path(), &["upgrade-all"]);
    assert!(ok);
    assert!(stdout.contains("Applied 3 migrations"), "stdout: {stdout}");
}

#[test]
fn test_connection_env_var_selects_connection() {
    let project = project();

    let (_, stderr, ok) = run_sw_with_env(project.path(), &["upgrade-all"], Some("audit"));
    assert!(ok, "upgrade-all failed: {stderr}");
    assert_eq!(
        count(
            &project.path().join("audit.duckdb"),
            "SELECT COUNT(*) FROM audit_schema_migrations"
        ),
        "2"
    );
    assert!(!project.path().join("app.duckdb").exists());

    // The flag beats the environment variable.
    let (_, _, ok) = run_sw_with_env(
        project.path(),
        &["upgrade-all", "--connection", "default"],
        Some("audit"),
    );
    assert!(ok);
    assert!(project.path().join("app.duckdb").exists());
}
