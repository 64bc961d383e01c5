use serde_json::Value;
use tempfile::tempdir;

use crate::common::{ccode, fixture, stderr_of, stdout_of};

#[test]
fn profiles_lists_declared_order_with_default_marker() {
    let home = tempdir().expect("can create temporary directory");
    let output = ccode(home.path())
        .args(["--config", &fixture("tests/fixtures/ccode.yaml"), "profiles"])
        .output()
        .expect("launcher should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "work (default)\nhome\n");
}

#[test]
fn show_json_masks_the_token() {
    let home = tempdir().expect("can create temporary directory");
    let output = ccode(home.path())
        .env("CCODE_CONFIG", fixture("tests/fixtures/ccode.toml"))
        .args(["show", "relay", "--json"])
        .output()
        .expect("launcher should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(payload["profile"], "relay");
    assert_eq!(
        payload["environment"]["ANTHROPIC_AUTH_TOKEN"],
        "sk-*************789"
    );
    assert_eq!(payload["environment"]["API_TIMEOUT_MS"], "600000");
}

#[test]
fn subcommand_errors_use_the_launcher_prefix() {
    let home = tempdir().expect("can create temporary directory");
    let output = ccode(home.path())
        .args(["--config", &fixture("tests/fixtures/ccode.yaml"), "show", "nope"])
        .output()
        .expect("launcher should run");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr_of(&output),
        "ccode: Unknown profile `nope` (available: home, work)\n"
    );
}
