use std::{fs, path::Path};

use serde_json::{json, Value};
use tempfile::tempdir;
use tokio::process::Command;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::common::{ccode, stderr_of, stdout_of};

const TOKEN: &str = "sk-catalog-123456";

fn write_config(dir: &Path, base_url: &str) -> String {
    let path = dir.join("ccode.yaml");
    let text = format!(
        "options:\n  relay:\n    ANTHROPIC_BASE_URL: {base_url}\n    ANTHROPIC_AUTH_TOKEN: \"{TOKEN}\"\n"
    );
    fs::write(&path, text).expect("can write config");
    path.display().to_string()
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "small-1", "owned_by": "acme"},
                {"id": "big-1", "owned_by": "acme"},
                {"id": "big-1", "owned_by": "zen"},
                {"id": "orphan"}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn models_lists_catalog_grouped_by_owner() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let home = tempdir().expect("can create temporary directory");
    let config = write_config(home.path(), &server.uri());

    let output = Command::from(ccode(home.path()))
        .args(["--config", &config, "models"])
        .output()
        .await
        .expect("launcher should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(
        stdout_of(&output),
        "Models for `relay` (3 total):\n  acme\n    big-1\n    small-1\n  zen\n    big-1\n"
    );
}

#[tokio::test]
async fn select_persists_choice_and_feeds_the_launch() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let home = tempdir().expect("can create temporary directory");
    let config = write_config(home.path(), &server.uri());

    let ambiguous = Command::from(ccode(home.path()))
        .args(["--config", &config, "select", "relay", "opus", "big-1"])
        .output()
        .await
        .expect("launcher should run");
    assert_eq!(ambiguous.status.code(), Some(1));
    assert!(
        stderr_of(&ambiguous).contains("acme, zen"),
        "stderr: {}",
        stderr_of(&ambiguous)
    );

    let selected = Command::from(ccode(home.path()))
        .args(["--config", &config, "select", "relay", "opus", "big-1"])
        .args(["--owner", "zen"])
        .output()
        .await
        .expect("launcher should run");
    assert!(selected.status.success(), "stderr: {}", stderr_of(&selected));
    assert_eq!(
        stdout_of(&selected),
        "Selected opus = big-1 (zen) for `relay`\n"
    );

    let stored = fs::read_to_string(home.path().join(".ccode/selections.json"))
        .expect("selection file written");
    let stored: Value = serde_json::from_str(&stored).expect("selection file is JSON");
    assert_eq!(
        stored["profiles"]["relay"]["opus"],
        json!({"owned_by": "zen", "id": "big-1"})
    );

    let dry_run = Command::from(ccode(home.path()))
        .args(["--config", &config, "--dry-run", "relay"])
        .output()
        .await
        .expect("launcher should run");
    assert!(dry_run.status.success(), "stderr: {}", stderr_of(&dry_run));
    assert!(
        stderr_of(&dry_run).contains("  ANTHROPIC_DEFAULT_OPUS_MODEL=big-1\n"),
        "stderr: {}",
        stderr_of(&dry_run)
    );
}

#[tokio::test]
async fn http_errors_report_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token\n"))
        .mount(&server)
        .await;
    let home = tempdir().expect("can create temporary directory");
    let config = write_config(home.path(), &server.uri());

    let output = Command::from(ccode(home.path()))
        .args(["--config", &config, "models", "relay"])
        .output()
        .await
        .expect("launcher should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.starts_with("ccode: failed to list models from"), "stderr: {stderr}");
    assert!(stderr.contains("HTTP 401: invalid token"), "stderr: {stderr}");
    assert_eq!(stderr.trim_end().lines().count(), 1);
}
