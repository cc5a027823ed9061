//! Integration tests for the `kr` CLI binary.
//!
//! Argument parsing, help, completions and local commands run without a
//! server. End-to-end cases drive the binary against a wiremock Kismet.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `kr` binary with env isolation.
///
/// Clears all `KR_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
/// `KR_PASSWORD` is set so credential resolution never reaches the keyring.
fn kr_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("kr");
    cmd.env("HOME", "/tmp/kr-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/kr-cli-test-nonexistent")
        .env("KR_PASSWORD", "test")
        .env("NO_COLOR", "1")
        .env_remove("KR_PROFILE")
        .env_remove("KR_SERVER")
        .env_remove("KR_PORT")
        .env_remove("KR_USERNAME")
        .env_remove("KR_OUTPUT")
        .env_remove("KR_TIMEOUT")
        .env_remove("KR_RETRIES")
        .env_remove("RUST_LOG");
    cmd
}

/// `kr_cmd()` aimed at a mock server.
fn kr_against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = kr_cmd();
    cmd.args([
        "-s",
        "127.0.0.1",
        "--port",
        &server.address().port().to_string(),
        "--timeout",
        "2",
    ]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_session(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/session/check_session"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn mount_sources(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/datasource/all_sources.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "kismet.datasource.name": "wlan0",
                "kismet.datasource.uuid": "5fe308bd-0000-0000-0000-00c0ca9a1b2c",
                "kismet.datasource.interface": "wlan0",
                "kismet.datasource.hardware": "rt2800usb",
                "kismet.datasource.channel": "1"
            },
            {
                "kismet.datasource.name": "wlan1",
                "kismet.datasource.uuid": "5fe308bd-0000-0000-0000-00c0ca9a1b2d",
                "kismet.datasource.interface": "wlan1",
                "kismet.datasource.hardware": "ath9k_htc",
                "kismet.datasource.channel": "11"
            }
        ])))
        .mount(server)
        .await;
}

/// Run the blocking binary off the async runtime so wiremock keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = kr_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    kr_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Kismet")
            .and(predicate::str::contains("tune"))
            .and(predicate::str::contains("rssi"))
            .and(predicate::str::contains("graph")),
    );
}

#[test]
fn test_version_flag() {
    kr_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kr"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    kr_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    kr_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    kr_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = kr_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_tune_requires_channel() {
    let output = kr_cmd().args(["tune", "wlan0"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--channel"));
}

#[test]
fn test_tune_requires_sources() {
    let output = kr_cmd().args(["tune", "-c", "6"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_rssi_requires_mac() {
    let output = kr_cmd().arg("rssi").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--mac"));
}

#[test]
fn test_unreachable_server_is_invalid_login() {
    let output = kr_cmd()
        .args([
            "-s",
            "127.0.0.1",
            "--port",
            "1",
            "--timeout",
            "1",
            "--retries",
            "0",
            "sources",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("Invalid login"), "output:\n{text}");
}

#[test]
fn test_empty_server_is_usage_error() {
    let output = kr_cmd().args(["-s", "", "sources"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Local commands ──────────────────────────────────────────────────

#[test]
fn test_config_path() {
    kr_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_defaults() {
    kr_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

// ── Against a mock server ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_session_exits_with_invalid_login() {
    let server = MockServer::start().await;
    mount_session(&server, 401).await;

    let mut cmd = kr_against(&server);
    cmd.arg("sources");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Connecting to Kismet Server"), "{stderr}");
    assert!(stderr.contains("Invalid login"), "{stderr}");
    assert!(!stderr.contains("Logged in!"), "{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sources_plain_lists_names() {
    let server = MockServer::start().await;
    mount_session(&server, 200).await;
    mount_sources(&server).await;

    let mut cmd = kr_against(&server);
    cmd.args(["sources", "-o", "plain"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "wlan0\nwlan1\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Logged in!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tune_existing_source() {
    let server = MockServer::start().await;
    mount_session(&server, 200).await;
    mount_sources(&server).await;
    Mock::given(method("GET"))
        .and(path("/datasource/list_interfaces.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(
            "/datasource/by-uuid/5fe308bd-0000-0000-0000-00c0ca9a1b2c/set_channel.cmd",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = kr_against(&server);
    cmd.args(["tune", "-c", "6", "wlan0", "ghost"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Tuned data source wlan0 to channel 6"),
        "{stdout}"
    );
    assert!(stdout.contains("No interface named ghost, ignoring"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tune_nothing_known_exits_one() {
    let server = MockServer::start().await;
    mount_session(&server, 200).await;
    mount_sources(&server).await;
    Mock::given(method("GET"))
        .and(path("/datasource/list_interfaces.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut cmd = kr_against(&server);
    cmd.args(["tune", "-c", "6", "ghost"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("No sources configured, exiting")
    );
}
