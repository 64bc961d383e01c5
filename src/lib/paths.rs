//! Resolution of the directories the launcher reads from and writes to.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Environment variable overriding the user home directory.
pub const CCODE_HOME_ENV: &str = "CCODE_HOME";
/// Environment variable name for user home directory.
const HOME_ENV: &str = "HOME";
/// Per-user state directory name under the home directory.
pub const STATE_DIR_NAME: &str = ".ccode";

/// Resolve the per-user state directory.
///
/// Resolution order:
/// 1. `$CCODE_HOME/.ccode` when `CCODE_HOME` is set.
/// 2. `$HOME/.ccode` otherwise.
pub fn resolve_state_dir() -> Option<PathBuf> {
    resolve_state_dir_from(env::var_os(CCODE_HOME_ENV), env::var_os(HOME_ENV))
}

/// Resolve the state directory from explicit environment values (testable helper).
pub fn resolve_state_dir_from(ccode_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    ccode_home
        .filter(|value| !value.is_empty())
        .or_else(|| home.filter(|value| !value.is_empty()))
        .map(|root| PathBuf::from(root).join(STATE_DIR_NAME))
}

/// Directory containing the running launcher executable.
pub fn launcher_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccode_home_takes_precedence_over_home() {
        let dir = resolve_state_dir_from(Some("/opt/ccode".into()), Some("/home/user".into()));
        assert_eq!(dir, Some(PathBuf::from("/opt/ccode/.ccode")));
    }

    #[test]
    fn falls_back_to_home_and_ignores_empty_values() {
        let dir = resolve_state_dir_from(Some(OsString::new()), Some("/home/user".into()));
        assert_eq!(dir, Some(PathBuf::from("/home/user/.ccode")));
        assert_eq!(resolve_state_dir_from(None, None), None);
    }
}
