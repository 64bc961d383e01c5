//! LaunchPlan and config/state path resolution.
use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{
    config::ConfigStore,
    lib::paths::{launcher_dir, resolve_state_dir},
    models::SELECTION_FILE_NAME,
    runtime::LaunchTarget,
};

/// Executable launched when `--command` is not given.
pub const DEFAULT_PROGRAM: &str = "claude";
pub const CONFIG_ENV: &str = "CCODE_CONFIG";
pub const COMMAND_ENV: &str = "CCODE_COMMAND";

/// Everything the launch pipeline needs, resolved from CLI args and environment.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub config_store: ConfigStore,
    pub profile: Option<String>,
    pub target: LaunchTarget,
    pub selections_path: Option<PathBuf>,
    pub dry_run: bool,
    pub quiet: bool,
}

/// Paths shared by every CLI command.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config_store: ConfigStore,
    pub selections_path: Option<PathBuf>,
}

/// Resolve where configuration is searched: an explicit path (CLI or env) is
/// the only candidate; otherwise the launcher directory, then the state directory.
pub fn resolve_config_store(override_path: Option<PathBuf>) -> Result<ConfigStore> {
    if let Some(path) = override_path {
        return Ok(ConfigStore::new(vec![absolutize(path)?]));
    }

    let state_dir = resolve_state_dir();
    Ok(ConfigStore::default_search(
        launcher_dir().as_deref(),
        state_dir.as_deref(),
    ))
}

/// Location of the persisted model selections, if a home directory is known.
pub fn resolve_selections_path() -> Option<PathBuf> {
    selections_path_in(resolve_state_dir().as_deref())
}

fn selections_path_in(state_dir: Option<&Path>) -> Option<PathBuf> {
    state_dir.map(|dir| dir.join(SELECTION_FILE_NAME))
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }

    let cwd = env::current_dir().context("failed to obtain current directory")?;
    Ok(cwd.join(path))
}
