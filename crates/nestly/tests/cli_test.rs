//! Integration tests for the `nestly` CLI binary.
//!
//! Argument parsing, help, completions and offline validation run without
//! a network. The end-to-end cases point a saved session at a wiremock
//! server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `nestly` binary with env isolation.
///
/// Clears `NESTLY_*` env vars and points config and cache directories at
/// `root` so tests never touch the user's real configuration.
fn nestly_cmd(root: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("nestly");
    cmd.env("HOME", root)
        .env("XDG_CONFIG_HOME", root.join("config"))
        .env("XDG_CACHE_HOME", root.join("cache"))
        .env_remove("NESTLY_EMAIL")
        .env_remove("NESTLY_PASSWORD")
        .env_remove("NESTLY_OUTPUT")
        .env_remove("NESTLY_TIMEOUT")
        .env_remove("NESTLY_CACHE_DIR")
        .env_remove("NESTLY_LAST_DEVICE")
        .env_remove("NESTLY_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let root = TempDir::new().unwrap();
    let output = nestly_cmd(root.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let root = TempDir::new().unwrap();
    nestly_cmd(root.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("list")
            .and(predicate::str::contains("set"))
            .and(predicate::str::contains("login")),
    );
}

#[test]
fn test_version_flag() {
    let root = TempDir::new().unwrap();
    nestly_cmd(root.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nestly"));
}

#[test]
fn test_completions_bash() {
    let root = TempDir::new().unwrap();
    nestly_cmd(root.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_unknown_topic_is_usage_error() {
    let root = TempDir::new().unwrap();
    nestly_cmd(root.path())
        .args(["list", "humidity"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_and_defaults() {
    let root = TempDir::new().unwrap();
    nestly_cmd(root.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    nestly_cmd(root.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout = 10").and(predicate::str::contains("alfred")));
}

// ── Offline validation ──────────────────────────────────────────────

#[test]
fn test_bad_values_fail_before_any_request() {
    let root = TempDir::new().unwrap();
    nestly_cmd(root.path())
        .args(["--output", "plain", "set", "fan", "turbo"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("fan"));

    nestly_cmd(root.path())
        .args(["--output", "plain", "set", "away", "maybe"])
        .assert()
        .code(2);

    nestly_cmd(root.path())
        .args(["--output", "plain", "set", "target", "20", "21"])
        .assert()
        .code(2);
}

#[test]
fn test_launcher_reports_bad_value_on_stdout() {
    let root = TempDir::new().unwrap();
    nestly_cmd(root.path())
        .args(["set", "mode", "dry"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Error:"));
}

#[test]
fn test_no_session_without_terminal_cancels_login() {
    let root = TempDir::new().unwrap();
    let output = nestly_cmd(root.path())
        .args(["--output", "plain", "--cache-dir"])
        .arg(root.path().join("sessions"))
        .args(["list", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("First things first"));
}

// ── End to end ──────────────────────────────────────────────────────

fn seed_session(dir: &Path, server: &MockServer) {
    std::fs::create_dir_all(dir).unwrap();
    let session = json!({
        "access_token": "tok",
        "userid": "u1",
        "expires_in": "Fri, 01-Jan-2100 00:00:00 GMT",
        "urls": {
            "transport_url": server.uri(),
            "weather_url": format!("{}/weather/", server.uri()),
        }
    });
    std::fs::write(dir.join("session.json"), session.to_string()).unwrap();
}

async fn mount_status(server: &MockServer) {
    let status = json!({
        "user": { "u1": { "structures": ["structure.s1"] } },
        "structure": {
            "s1": { "name": "Home", "postal_code": "94105", "away": false, "devices": ["device.d1", "device.d2"] }
        },
        "device": {
            "d1": { "temperature_scale": "F", "current_humidity": 40, "current_schedule_mode": "heat", "fan_mode": "auto", "leaf": false },
            "d2": { "temperature_scale": "C", "current_humidity": 45, "current_schedule_mode": "cool", "fan_mode": "on", "leaf": false }
        },
        "shared": {
            "d1": { "name": "Hallway", "target_temperature": 20.0, "current_temperature": 21.0 },
            "d2": { "name": "Bedroom", "target_temperature": 22.0, "current_temperature": 23.0 }
        },
        "metadata": {}
    });
    Mock::given(method("GET"))
        .and(path("/v2/mobile/user.u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status))
        .mount(server)
        .await;
}

fn alfred_items(stdout: &[u8]) -> Vec<Value> {
    let value: Value = serde_json::from_slice(stdout).unwrap();
    value["items"].as_array().unwrap().clone()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_fan_and_mode_as_alfred_items() {
    let root = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let sessions = root.path().join("sessions");
    seed_session(&sessions, &server);
    mount_status(&server).await;

    let output = nestly_cmd(root.path())
        .arg("--cache-dir")
        .arg(&sessions)
        .args(["list", "fan"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let items = alfred_items(&output.stdout);
    assert_eq!(items[0]["title"], "Fan is in auto mode");
    assert_eq!(items[0]["arg"], "on");
    assert_eq!(items[0]["valid"], true);

    let output = nestly_cmd(root.path())
        .arg("--cache-dir")
        .arg(&sessions)
        .args(["list", "mode", "co"])
        .output()
        .unwrap();
    let titles: Vec<String> = alfred_items(&output.stdout)
        .iter()
        .map(|i| i["title"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(titles, vec!["Cool", "Heat/cool"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_target_in_fahrenheit() {
    let root = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let sessions = root.path().join("sessions");
    seed_session(&sessions, &server);
    mount_status(&server).await;

    Mock::given(method("POST"))
        .and(path("/v2/put/shared.d1"))
        .and(body_json(json!({
            "target_change_pending": true,
            "target_temperature": (68.0 - 32.0) / 1.8
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    nestly_cmd(root.path())
        .arg("--cache-dir")
        .arg(&sessions)
        .args(["set", "target", "68"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Target temperature set to 68°F"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_select_device_is_remembered() {
    let root = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let sessions = root.path().join("sessions");
    seed_session(&sessions, &server);
    mount_status(&server).await;

    nestly_cmd(root.path())
        .arg("--cache-dir")
        .arg(&sessions)
        .args(["set", "device", "d2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Now controlling Bedroom"));

    let output = nestly_cmd(root.path())
        .arg("--cache-dir")
        .arg(&sessions)
        .args(["list", "fan"])
        .output()
        .unwrap();
    let items = alfred_items(&output.stdout);
    assert_eq!(items[0]["title"], "Fan is on");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_write_is_reported_in_launcher_output() {
    let root = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let sessions = root.path().join("sessions");
    seed_session(&sessions, &server);
    mount_status(&server).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    nestly_cmd(root.path())
        .arg("--cache-dir")
        .arg(&sessions)
        .args(["set", "fan", "on"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Request failed: backend down"));
}
