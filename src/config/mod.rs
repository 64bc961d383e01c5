//! Locate, load and validate the profile configuration document.
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::lib::errors::ConfigError;

pub mod layered;
pub mod telemetry;
pub mod toml_format;

/// Variable name → value mapping used for `common` and for each profile.
pub type VarMap = BTreeMap<String, String>;

/// File name searched for in each candidate directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["ccode.yaml", "ccode.toml"];

/// A named set of variable overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub vars: VarMap,
}

/// Shared defaults plus the profiles, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    common: VarMap,
    profiles: Vec<Profile>,
    source_path: PathBuf,
}

impl ConfigDocument {
    /// Build a document, enforcing the invariants every loader guarantees:
    /// at least one profile, valid names, no duplicates.
    pub fn from_parts(
        common: VarMap,
        profiles: Vec<Profile>,
        source_path: PathBuf,
    ) -> Result<Self, ConfigError> {
        if profiles.is_empty() {
            return Err(ConfigError::malformed(
                source_path,
                "`options` must define at least one profile",
            ));
        }
        for (index, profile) in profiles.iter().enumerate() {
            if !is_valid_profile_name(&profile.name) {
                return Err(ConfigError::malformed(
                    source_path,
                    invalid_profile_name_message(&profile.name),
                ));
            }
            if profiles[..index].iter().any(|p| p.name == profile.name) {
                return Err(ConfigError::malformed(
                    source_path,
                    format!("profile `{}` is defined more than once", profile.name),
                ));
            }
        }

        Ok(Self {
            common,
            profiles,
            source_path,
        })
    }

    pub fn common(&self) -> &VarMap {
        &self.common
    }

    /// Profiles in the order they were declared.
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    /// The first declared profile, selected when none is requested.
    pub fn default_profile(&self) -> &Profile {
        // `from_parts` rejects documents without profiles.
        &self.profiles[0]
    }

    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|profile| profile.name.as_str())
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

/// Ordered list of places a configuration document may live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    candidates: Vec<PathBuf>,
}

impl ConfigStore {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Candidates for the default search: next to the launcher, then the
    /// per-user state directory. Missing directories are skipped.
    pub fn default_search(launcher_dir: Option<&Path>, state_dir: Option<&Path>) -> Self {
        let candidates = [launcher_dir, state_dir]
            .into_iter()
            .flatten()
            .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
            .collect();
        Self::new(candidates)
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Load the first candidate that exists.
    pub fn load(&self) -> Result<ConfigDocument, ConfigError> {
        let Some(path) = self.candidates.iter().find(|path| path.exists()) else {
            let error = ConfigError::NotFound {
                candidates: self.candidates.clone(),
            };
            debug!(target: "ccode::config", reason = %error, "No configuration file found");
            return Err(error);
        };

        telemetry::log_candidate_chosen(path, &self.candidates);
        load_from_path(path)
    }
}

/// Read and parse a specific file, choosing the format by extension.
pub fn load_from_path(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| {
        let error = ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        };
        debug!(target: "ccode::config", reason = %error, "Failed to read configuration file");
        error
    })?;

    let document = parse_document(&text, path).map_err(|err| {
        debug!(
            target: "ccode::config",
            path = %path.display(),
            reason = %err,
            "Failed to parse configuration file"
        );
        err
    })?;

    telemetry::log_loaded(&document);
    Ok(document)
}

/// Parse document text; `path` selects the format and labels errors.
pub fn parse_document(text: &str, path: &Path) -> Result<ConfigDocument, ConfigError> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml_format::parse(text, path)
    } else {
        layered::parse(text, path)
    }
}

/// Profile names are ASCII alphanumerics and underscores only.
pub fn is_valid_profile_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

pub(crate) fn invalid_profile_name_message(name: &str) -> String {
    format!("invalid profile name `{name}`: use letters, digits and underscores only")
}

/// Variable names must be non-empty and free of `=`, NUL and whitespace so
/// they can be set on a child process.
pub fn is_valid_env_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(|ch: char| ch == '=' || ch == '\0' || ch.is_whitespace())
}

pub(crate) fn invalid_env_key_message(key: &str) -> String {
    format!("`{}` is not a valid environment variable name", key.escape_debug())
}
