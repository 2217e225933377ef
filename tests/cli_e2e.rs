//! End-to-end CLI tests for the ledger-report binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary with an isolated config location and the given credentials.
fn ledger_report(home: &TempDir, with_credentials: bool) -> Command {
    let mut cmd = Command::cargo_bin("ledger-report").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("RUST_LOG");
    if with_credentials {
        cmd.env("LEDGER_CLIENT_ID", "client-123")
            .env("LEDGER_CLIENT_SECRET", "s3cret")
            .env("LEDGER_SUBSCRIPTION_KEY", "sub-key");
    } else {
        cmd.env_remove("LEDGER_CLIENT_ID")
            .env_remove("LEDGER_CLIENT_SECRET")
            .env_remove("LEDGER_SUBSCRIPTION_KEY");
    }
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("ledger-report").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetch a CSV ledger report"))
        .stdout(predicate::str::contains("--poll-interval"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("ledger-report").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ledger-report"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("ledger-report").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_missing_credentials_exits_one() {
    let home = TempDir::new().unwrap();
    ledger_report(&home, false)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("LEDGER_CLIENT_ID"))
        .stderr(predicate::str::contains("s3cret").not());
}

#[test]
fn test_binary_missing_explicit_config_exits_one() {
    let home = TempDir::new().unwrap();
    ledger_report(&home, true)
        .args(["--config", "/definitely/not/here.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_binary_invalid_config_value_exits_one() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("ledger.toml");
    std::fs::write(&config, "max_attempts = 0\n").unwrap();

    ledger_report(&home, true)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max_attempts"));
}

#[test]
fn test_binary_inverted_range_fails_before_network() {
    let home = TempDir::new().unwrap();
    ledger_report(&home, true)
        .args([
            "--base-url",
            "http://127.0.0.1:9",
            "--start",
            "2024-02-01",
            "--end",
            "2024-01-01",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("REQUEST_FAILED"));
}

async fn mount_platform(server: &MockServer, token_status: u16) {
    let token_response = if token_status == 200 {
        ResponseTemplate::new(200).set_body_json(json!({ "access_token": "abc", "expires_in": 3600 }))
    } else {
        ResponseTemplate::new(token_status).set_body_string("denied")
    };
    Mock::given(method("POST"))
        .and(path("/accessToken/get"))
        .respond_with(token_response)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vipps-report/v1/report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reportId": "R1" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vipps-report/v1/report/R1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETED",
            "reportUrl": format!("{}/files/r1.csv", server.uri())
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/r1.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a,b\n1,2".to_vec()))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_binary_full_run_writes_report_and_prints_path() {
    let server = MockServer::start().await;
    mount_platform(&server, 200).await;

    let home = TempDir::new().unwrap();
    let output = home.path().join("reports");
    let mut cmd = ledger_report(&home, true);
    cmd.arg("--base-url")
        .arg(server.uri())
        .arg("--output-dir")
        .arg(&output)
        .args(["--start", "2024-01-01", "--end", "2024-01-31", "--poll-interval", "0"]);

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .code(0)
            .stdout(predicate::str::contains("ledger_report_R1.csv"));
    })
    .await
    .unwrap();

    let written = std::fs::read(output.join("ledger_report_R1.csv")).unwrap();
    assert_eq!(written, b"a,b\n1,2");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_binary_auth_rejected_exits_two() {
    let server = MockServer::start().await;
    mount_platform(&server, 401).await;

    let home = TempDir::new().unwrap();
    let mut cmd = ledger_report(&home, true);
    cmd.arg("--base-url")
        .arg(server.uri())
        .arg("--output-dir")
        .arg(home.path())
        .args(["--start", "2024-01-01", "--end", "2024-01-31"]);

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .code(2)
            .stderr(predicate::str::contains("AUTH_FAILED"));
    })
    .await
    .unwrap();
}
