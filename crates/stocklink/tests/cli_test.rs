//! Integration tests for the `stocklink` CLI binary.
//!
//! Argument parsing, help, completions, and local-session behavior run
//! without a backend; the session round trip runs against a mock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `stocklink` binary with env isolation.
///
/// Clears all `STOCKLINK_*` env vars and points home, config, and data
/// directories into `home` so tests never touch real state.
fn stocklink_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("stocklink");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("STOCKLINK_BASE_URL")
        .env_remove("STOCKLINK_STORAGE_DIR")
        .env_remove("STOCKLINK_OUTPUT")
        .env_remove("STOCKLINK_TIMEOUT")
        .env_remove("STOCKLINK_TOKEN")
        .env_remove("STOCKLINK_API__BASE_URL")
        .env_remove("STOCKLINK_APP__VERSION");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "data": data }))
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = stocklink_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    stocklink_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("AIStockLink")
            .and(predicate::str::contains("session"))
            .and(predicate::str::contains("favorites"))
            .and(predicate::str::contains("cache")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    stocklink_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stocklink"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    stocklink_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    let output = stocklink_cmd(home.path())
        .args(["--output", "xml", "market"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("xml"));
}

#[test]
fn test_push_set_rejects_bad_toggle() {
    let home = tempfile::tempdir().unwrap();
    let output = stocklink_cmd(home.path())
        .args(["push", "set", "morning=maybe"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_favorites_without_session_is_auth_error() {
    let home = tempfile::tempdir().unwrap();
    let output = stocklink_cmd(home.path())
        .args(["favorites", "list", "--cached"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Not signed in"));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = stocklink_cmd(home.path())
        .args(["--base-url", "ftp://example.com", "session", "status"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("unsupported scheme"));
}

// ── Local session ───────────────────────────────────────────────────

#[test]
fn test_session_status_signed_out() {
    let home = tempfile::tempdir().unwrap();
    stocklink_cmd(home.path())
        .args(["session", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

#[test]
fn test_session_status_json() {
    let home = tempfile::tempdir().unwrap();
    let output = stocklink_cmd(home.path())
        .args(["-o", "json", "session", "status"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["authenticated"], json!(false));
    assert_eq!(view["build_version"], json!(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cache_status_records_build() {
    let home = tempfile::tempdir().unwrap();
    let storage = home.path().join("store");
    stocklink_cmd(home.path())
        .arg("--storage-dir")
        .arg(&storage)
        .args(["cache", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    assert!(storage.join("storage.json").exists());
}

#[test]
fn test_cache_purge_requires_yes_when_piped() {
    let home = tempfile::tempdir().unwrap();
    let output = stocklink_cmd(home.path())
        .args(["cache", "purge"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_points_into_config_dir() {
    let home = tempfile::tempdir().unwrap();
    stocklink_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_then_show() {
    let home = tempfile::tempdir().unwrap();
    stocklink_cmd(home.path())
        .args(["config", "init", "--base-url", "https://api.example.test"])
        .assert()
        .success();
    stocklink_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://api.example.test"));
}

#[test]
fn test_config_init_without_url_needs_terminal() {
    let home = tempfile::tempdir().unwrap();
    let output = stocklink_cmd(home.path())
        .args(["config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_session_across_runs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/info"))
        .and(header("authorization", "Bearer jwt-abc"))
        .respond_with(ok(json!({ "user_id": 7, "nickname": "alice" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stocks/get"))
        .respond_with(ok(json!([{ "code": "600519", "name": "贵州茅台" }])))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let home_path = home.path().to_path_buf();
    let base = server.uri();

    tokio::task::spawn_blocking(move || {
        stocklink_cmd(&home_path)
            .args(["--base-url", &base, "session", "login", "--token", "jwt-abc"])
            .assert()
            .success()
            .stdout(predicate::str::contains("alice"));

        stocklink_cmd(&home_path)
            .args(["--base-url", &base, "-o", "plain", "favorites", "list", "--cached"])
            .assert()
            .success()
            .stdout(predicate::str::contains("600519"));

        stocklink_cmd(&home_path)
            .args(["--base-url", &base, "session", "logout"])
            .assert()
            .success();

        stocklink_cmd(&home_path)
            .args(["--base-url", &base, "session", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Not signed in"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_market_falls_back_when_backend_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/market/overview"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let home_path = home.path().to_path_buf();
    let base = server.uri();

    tokio::task::spawn_blocking(move || {
        stocklink_cmd(&home_path)
            .args(["--base-url", &base, "-o", "plain", "market"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("shangzheng")
                    .and(predicate::str::contains("shenzheng"))
                    .and(predicate::str::contains("chuangye")),
            );
    })
    .await
    .unwrap();
}
