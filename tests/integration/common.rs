use std::{
    path::{Path, PathBuf},
    process::Command,
};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_ccode");

pub fn fixture(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.join(relative).display().to_string()
}

/// Launcher command isolated from the caller's environment: state lives under
/// `home`, logging is off so stderr only carries launcher output.
pub fn ccode(home: &Path) -> Command {
    let mut command = Command::new(BINARY_PATH);
    command
        .env_remove("CCODE_CONFIG")
        .env_remove("CCODE_COMMAND")
        .env("CCODE_HOME", home)
        .env("RUST_LOG", "off");
    command
}

pub fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
