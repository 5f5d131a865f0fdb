//! Integration tests for the `hubctl` CLI binary.
//!
//! Argument parsing, help output, completions, config handling, and error
//! paths run offline; the end-to-end tests talk to a wiremock hub.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `hubctl` binary with env isolation.
///
/// Clears all `HUBCTL_*` env vars and points the config path at a
/// nonexistent file so tests never touch the user's real configuration.
fn hubctl_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hubctl");
    cmd.env("HOME", "/tmp/hubctl-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/hubctl-test-nonexistent")
        .env("HUBCTL_CONFIG", "/tmp/hubctl-test-nonexistent/config.toml")
        .env_remove("HUBCTL_PROFILE")
        .env_remove("HUBCTL_HUB")
        .env_remove("HUBCTL_OUTPUT")
        .env_remove("HUBCTL_INSECURE")
        .env_remove("HUBCTL_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn device_json(uuid: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "uuid": uuid,
        "mac": "48:e1:e9:aa:bb:cc",
        "dev_name": name,
        "online_status": 1,
        "device_type": "msh300",
        "bind_time": 1_709_317_325_i64,
        "local_ip": "192.168.1.40",
        "channels": [{"device_channel_id": 1, "channel_id": 0}],
    })
}

/// Mount the three collection endpoints every connected session fetches.
async fn mount_collections(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/_admin_/devices"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([device_json("2401aabb01", "Desk Lamp")])),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_admin_/subdevices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_admin_/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "MQTT Service", "status": "RUNNING", "pid": 17},
            {"name": "Local Agent", "status": "STOPPED", "exit_code": 0},
        ])))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = hubctl_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    hubctl_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Meross LAN hub")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("services"))
            .and(predicate::str::contains("account")),
    );
}

#[test]
fn test_version_flag() {
    hubctl_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hubctl"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    hubctl_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    hubctl_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    hubctl_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = hubctl_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_devices_list_no_config() {
    hubctl_cmd()
        .args(["devices", "list"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("Configuration"))
                .or(predicate::str::contains("hub")),
        );
}

#[test]
fn test_invalid_hub_url_is_usage_error() {
    hubctl_cmd()
        .args(["--hub", "not a url", "devices", "list"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn test_invalid_output_format() {
    let output = hubctl_cmd()
        .args(["--output", "invalid", "devices", "list"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse; the failure should be about missing hub
    // config, not about argument parsing.
    hubctl_cmd()
        .args([
            "--output",
            "json",
            "--verbose",
            "--insecure",
            "--timeout",
            "60",
            "devices",
            "list",
        ])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("Configuration"))
                .or(predicate::str::contains("hub")),
        );
}

// ── Config handling ─────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` uses load_config_or_default() so it succeeds even
    // when no config file exists; it just renders the defaults.
    hubctl_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_path_respects_env_override() {
    hubctl_cmd()
        .env("HUBCTL_CONFIG", "/tmp/custom-hubctl/config.toml")
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/custom-hubctl/config.toml"));
}

#[test]
fn test_config_set_writes_profile() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    hubctl_cmd()
        .env("HUBCTL_CONFIG", &config_path)
        .args(["config", "set", "hub", "http://192.168.7.2:2002"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Set hub"));

    let written = std::fs::read_to_string(&config_path).unwrap();
    assert!(
        written.contains("http://192.168.7.2:2002"),
        "config file missing hub URL:\n{written}"
    );

    hubctl_cmd()
        .env("HUBCTL_CONFIG", &config_path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("192.168.7.2"));
}

#[test]
fn test_config_use_unknown_profile_fails() {
    hubctl_cmd()
        .args(["config", "use", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_devices_subcommands_exist() {
    hubctl_cmd()
        .args(["devices", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("rename"))
                .and(predicate::str::contains("watch")),
        );
}

#[test]
fn test_services_subcommands_exist() {
    hubctl_cmd()
        .args(["services", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("start"))
                .and(predicate::str::contains("stop"))
                .and(predicate::str::contains("restart"))
                .and(predicate::str::contains("logs")),
        );
}

#[test]
fn test_account_subcommands_exist() {
    hubctl_cmd()
        .args(["account", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show").and(predicate::str::contains("set")));
}

#[test]
fn test_config_subcommands_exist() {
    hubctl_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("profiles"))
                .and(predicate::str::contains("path")),
        );
}

// ── End to end against a mock hub ───────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_json_end_to_end() {
    let server = MockServer::start().await;
    mount_collections(&server).await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        hubctl_cmd()
            .args(["--hub", &uri, "--output", "json", "devices", "list"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["uuid"], "2401aabb01");
    assert_eq!(parsed[0]["name"], "Desk Lamp");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_services_restart_end_to_end() {
    let server = MockServer::start().await;
    mount_collections(&server).await;
    Mock::given(method("POST"))
        .and(path("/_admin_/services/MQTT%20Service/execute/restart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(true))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        hubctl_cmd()
            .args(["--hub", &uri, "services", "restart", "MQTT Service"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("restarted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_show_unknown_exits_not_found() {
    let server = MockServer::start().await;
    mount_collections(&server).await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        hubctl_cmd()
            .args(["--hub", &uri, "devices", "show", "no-such-device"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(4), "Expected NOT_FOUND exit code");
    assert!(String::from_utf8_lossy(&output.stderr).contains("no-such-device"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_account_show_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_admin_/configuration/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "email": "home@example.com",
            "user_id": 4170,
            "mqtt_key": "a1b2c3",
            "enable_meross_link": false,
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        hubctl_cmd()
            .args(["--hub", &uri, "--output", "json", "account", "show"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["email"], "home@example.com");
}
