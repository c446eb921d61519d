//! Integration tests for the `zteng` CLI binary.
//!
//! Argument parsing, offline commands and error exit codes run without a
//! router; `status` and `watch` run against a wiremock router.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `zteng` binary with env isolation.
///
/// Clears all `ZTENG_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn zteng_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("zteng");
    cmd.env("HOME", "/tmp/zteng-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/zteng-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ZTENG_PROFILE")
        .env_remove("ZTENG_ROUTER")
        .env_remove("ZTENG_PASSWORD")
        .env_remove("ZTENG_OUTPUT")
        .env_remove("ZTENG_INSECURE")
        .env_remove("ZTENG_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a command on a blocking thread so a wiremock server on the test
/// runtime keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Mock router ─────────────────────────────────────────────────────

struct Ubus(&'static str, &'static str);

impl Match for Ubus {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return false;
        };
        body[0]["params"][1] == self.0 && body[0]["params"][2] == self.1
    }
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([{
        "jsonrpc": "2.0",
        "id": 0,
        "result": [0, data]
    }]))
}

async fn mount(
    server: &MockServer,
    service: &'static str,
    ubus_method: &'static str,
    response: ResponseTemplate,
) {
    Mock::given(method("POST"))
        .and(path("/ubus/"))
        .and(Ubus(service, ubus_method))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mock_router(salt: Option<&str>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let info = salt.map_or_else(|| json!({}), |s| json!({ "zte_web_sault": s }));
    mount(&server, "zwrt_web", "web_login_info", ok(info)).await;
    mount(&server, "zwrt_web", "web_login", ok(json!({ "ubus_rpc_session": "tok-1" }))).await;
    mount(
        &server,
        "zte_nwinfo_api",
        "nwinfo_get_netinfo",
        ok(json!({
            "network_type": "ENDC",
            "lte_action_channel": "1300",
            "lte_bandwidth": "20",
            "lte_rsrp": "-95",
            "nr5g_action_channel": "650000",
            "nr5g_bandwidth": "100",
        })),
    )
    .await;
    mount(&server, "zwrt_bsp.thermal", "get_cpu_temp", ok(json!({ "cpuss_temp": "47" }))).await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = zteng_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    zteng_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("ZTE")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("band")),
    );
}

#[test]
fn test_version_flag() {
    zteng_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("zteng"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    zteng_cmd().arg("reboot").assert().code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    zteng_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("zteng"));
}

#[test]
fn test_completions_zsh() {
    zteng_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Offline band lookup ─────────────────────────────────────────────

#[test]
fn test_band_lte_plain() {
    zteng_cmd()
        .args(["band", "lte", "1300", "-o", "plain"])
        .assert()
        .success()
        .stdout("B3\n");
}

#[test]
fn test_band_nr_json() {
    let output = zteng_cmd()
        .args(["band", "nr", "650000", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["band"], "N78");
    assert_eq!(parsed["technology"], "NR");
}

#[test]
fn test_band_unknown_channel() {
    zteng_cmd()
        .args(["band", "lte", "700", "-o", "plain"])
        .assert()
        .success()
        .stdout("-\n");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    zteng_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_defaults() {
    zteng_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scan_interval = 60"));
}

#[test]
fn test_config_use_missing_profile() {
    zteng_cmd()
        .args(["config", "use", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere"));
}

// ── Connection errors ───────────────────────────────────────────────

#[test]
fn test_status_without_router() {
    zteng_cmd()
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No router configured"));
}

#[test]
fn test_status_unknown_profile() {
    zteng_cmd()
        .args(["--profile", "attic", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("attic"));
}

#[test]
fn test_watch_rejects_short_interval() {
    zteng_cmd()
        .args([
            "--router",
            "http://127.0.0.1:9",
            "--password",
            "x",
            "watch",
            "--interval",
            "1",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("scan_interval"));
}

#[test]
fn test_watch_rejects_zero_count() {
    zteng_cmd()
        .args([
            "--router",
            "http://127.0.0.1:9",
            "--password",
            "x",
            "watch",
            "--count",
            "0",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--count"));
}

#[test]
fn test_unreachable_router_is_auth_failure() {
    zteng_cmd()
        .args(["--router", "http://127.0.0.1:9", "--password", "x", "--timeout", "2", "status"])
        .assert()
        .code(3);
}

// ── Against a mock router ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = mock_router(Some("ABCDEF")).await;

    let mut cmd = zteng_cmd();
    cmd.args(["--router", &server.uri(), "--password", "secret", "status", "-o", "json"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["bands_summary"], "B3 + N78");
    assert_eq!(parsed["total_bandwidth_mhz"], 120.0);
    assert_eq!(parsed["metrics"]["connection_type"], "5G NSA");
    assert_eq!(parsed["metrics"]["lte_rsrp"], -95.0);
    assert_eq!(parsed["metrics"]["cpu_temp"], 47.0);
    assert_eq!(parsed["metrics"]["uptime"], Value::Null);
    assert_eq!(parsed["device"], Value::Null);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_table() {
    let server = mock_router(Some("ABCDEF")).await;

    let mut cmd = zteng_cmd();
    cmd.args(["--router", &server.uri(), "--password", "secret", "status"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total Bandwidth"), "{stdout}");
    assert!(stdout.contains("120 MHz"), "{stdout}");
    assert!(stdout.contains("-95 dBm"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_login_failure_exit_code() {
    let server = mock_router(None).await;

    let mut cmd = zteng_cmd();
    cmd.args(["--router", &server.uri(), "--password", "secret", "status"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Authentication failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_single_poll() {
    let server = mock_router(Some("ABCDEF")).await;

    let mut cmd = zteng_cmd();
    cmd.args([
        "--router",
        &server.uri(),
        "--password",
        "secret",
        "watch",
        "--interval",
        "5",
        "--count",
        "1",
        "-o",
        "plain",
    ]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bands_summary\tB3 + N78"), "{stdout}");
    assert!(stdout.contains("wan_ipv4\t-"), "{stdout}");
}
