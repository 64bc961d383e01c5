use tempfile::tempdir;

use crate::common::{ccode, fixture, stderr_of, stdout_of};

#[cfg(unix)]
#[test]
fn child_receives_profile_environment_and_arguments() {
    let home = tempdir().expect("can create temporary directory");
    let output = ccode(home.path())
        .args(["--config", &fixture("tests/fixtures/ccode.yaml")])
        .args(["--quiet", "--command", "sh", "work"])
        .args([
            "-c",
            "printf '%s|%s|%s' \"$DISABLE_TELEMETRY\" \"$API_TIMEOUT_MS\" \"$1\"",
            "ccode-test",
            "forwarded arg",
        ])
        .output()
        .expect("launcher should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "0|600000|forwarded arg");
    assert_eq!(stderr_of(&output), "", "--quiet suppresses the summary");
}

#[cfg(unix)]
#[test]
fn launcher_leaves_unrelated_variables_alone() {
    let home = tempdir().expect("can create temporary directory");
    let output = ccode(home.path())
        .env("CCODE_TEST_INHERITED", "kept")
        .env("DISABLE_TELEMETRY", "from-parent")
        .args(["--config", &fixture("tests/fixtures/ccode.yaml")])
        .args(["--quiet", "--command", "sh", "home"])
        .args([
            "-c",
            "printf '%s|%s' \"$CCODE_TEST_INHERITED\" \"$DISABLE_TELEMETRY\"",
        ])
        .output()
        .expect("launcher should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "kept|1");
}

#[cfg(unix)]
#[test]
fn child_exit_code_is_propagated() {
    let home = tempdir().expect("can create temporary directory");
    let status = ccode(home.path())
        .args(["--config", &fixture("tests/fixtures/ccode.yaml")])
        .args(["--quiet", "--command", "sh", "work", "-c", "exit 7"])
        .status()
        .expect("launcher should run");

    assert_eq!(status.code(), Some(7));
}

#[cfg(unix)]
#[test]
fn launcher_flags_after_profile_reach_the_child() {
    let home = tempdir().expect("can create temporary directory");
    for flag in ["--help", "--dry-run", "--quiet", "--version"] {
        let output = ccode(home.path())
            .args(["--config", &fixture("tests/fixtures/ccode.yaml")])
            .args(["--quiet", "--command", "printf", "work", "%s|", flag])
            .output()
            .expect("launcher should run");

        assert!(output.status.success(), "stderr: {}", stderr_of(&output));
        assert_eq!(stdout_of(&output), format!("{flag}|"));
    }
}

#[cfg(unix)]
#[test]
fn arguments_after_profile_are_forwarded_unchanged() {
    let home = tempdir().expect("can create temporary directory");
    let output = ccode(home.path())
        .args(["--config", &fixture("tests/fixtures/ccode.yaml")])
        .args(["--quiet", "--command", "printf", "work", "%s|"])
        .args(["--config", "elsewhere.yaml", "--", "home"])
        .output()
        .expect("launcher should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "--config|elsewhere.yaml|--|home|");
}

#[cfg(unix)]
#[test]
fn interrupt_leaves_the_child_in_charge_of_the_exit_code() {
    let home = tempdir().expect("can create temporary directory");
    let status = ccode(home.path())
        .args(["--config", &fixture("tests/fixtures/ccode.yaml")])
        .args(["--quiet", "--command", "sh", "work", "-c"])
        .arg("trap 'exit 5' INT; kill -INT $PPID; kill -QUIT $PPID; sleep 1; exit 9")
        .status()
        .expect("launcher should run");

    assert_eq!(status.code(), Some(9), "status: {status:?}");
}

#[test]
fn missing_program_exits_127_with_one_line() {
    let home = tempdir().expect("can create temporary directory");
    let output = ccode(home.path())
        .args(["--config", &fixture("tests/fixtures/ccode.yaml")])
        .args(["--quiet", "--command", "ccode-no-such-program", "work"])
        .output()
        .expect("launcher should run");

    assert_eq!(output.status.code(), Some(127));
    let stderr = stderr_of(&output);
    assert!(
        stderr.starts_with("ccode: Failed to start `ccode-no-such-program`"),
        "stderr: {stderr}"
    );
    assert_eq!(stderr.trim_end().lines().count(), 1);
}

#[test]
fn dry_run_prints_masked_summary_without_launching() {
    let home = tempdir().expect("can create temporary directory");
    let output = ccode(home.path())
        .args(["--config", &fixture("tests/fixtures/ccode.yaml")])
        .args(["--dry-run", "--command", "ccode-no-such-program"])
        .output()
        .expect("launcher should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(
        stderr_of(&output),
        "Profile: work\n\
         \x20 ANTHROPIC_AUTH_TOKEN=sk-*******890\n\
         \x20 ANTHROPIC_BASE_URL=https://work.example\n\
         \x20 API_TIMEOUT_MS=600000\n\
         \x20 DISABLE_TELEMETRY=0\n"
    );
    assert_eq!(stdout_of(&output), "");
}

#[test]
fn unknown_profile_lists_available_names() {
    let home = tempdir().expect("can create temporary directory");
    let output = ccode(home.path())
        .args(["--config", &fixture("tests/fixtures/ccode.yaml")])
        .args(["--dry-run", "nope"])
        .output()
        .expect("launcher should run");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr_of(&output),
        "ccode: Unknown profile `nope` (available: home, work)\n"
    );
}

#[test]
fn missing_configuration_names_the_searched_path() {
    let home = tempdir().expect("can create temporary directory");
    let absent = home.path().join("absent.yaml");
    let output = ccode(home.path())
        .env("CCODE_CONFIG", &absent)
        .arg("--dry-run")
        .output()
        .expect("launcher should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.starts_with("ccode: No configuration file found"), "stderr: {stderr}");
    assert!(stderr.contains(&absent.display().to_string()), "stderr: {stderr}");
}

#[test]
fn toml_configuration_is_accepted() {
    let home = tempdir().expect("can create temporary directory");
    let output = ccode(home.path())
        .args(["--config", &fixture("tests/fixtures/ccode.toml")])
        .args(["--dry-run", "local"])
        .output()
        .expect("launcher should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stderr = stderr_of(&output);
    assert!(stderr.starts_with("Profile: local\n"), "stderr: {stderr}");
    assert!(stderr.contains("  ANTHROPIC_AUTH_TOKEN=*****\n"), "stderr: {stderr}");
    assert!(stderr.contains("  API_TIMEOUT_MS=600000\n"), "stderr: {stderr}");
}
