use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur while locating or parsing the profile configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// None of the candidate files exist.
    #[error("No configuration file found (searched: {})", display_paths(.candidates))]
    NotFound { candidates: Vec<PathBuf> },
    /// The chosen file exists but could not be read.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Structural violation in the document.
    #[error("Malformed configuration file {path}{}: {message}", display_line(.line))]
    Malformed {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },
}

impl ConfigError {
    /// Helper for a malformed document where a specific line is at fault.
    pub fn malformed_at(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            line: Some(line),
            message: message.into(),
        }
    }

    /// Helper for a malformed document as a whole (e.g. no profiles).
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            line: None,
            message: message.into(),
        }
    }
}

/// Errors returned while selecting a profile.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unknown profile `{requested}` (available: {})", .available.join(", "))]
    UnknownProfile {
        requested: String,
        available: Vec<String>,
    },
}

/// Failure to start the target executable.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("Failed to start `{program}`: {source}")]
    SpawnFailure {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Failures while fetching the remote model list.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Profile `{profile}` needs ANTHROPIC_BASE_URL and ANTHROPIC_AUTH_TOKEN to list models")]
    MissingCredentials { profile: String },
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Invalid JSON response")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Response JSON missing data array")]
    MissingData,
}

/// Failures while updating persisted model selections.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Failed to write selections to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize selections: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Model `{id}` is not offered by the endpoint")]
    UnknownModel { id: String },
    #[error("Model `{id}` is offered by several owners ({}); pass --owner", .owners.join(", "))]
    AmbiguousModel { id: String, owners: Vec<String> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_line(line: &Option<usize>) -> String {
    line.map(|line| format!(" (line {line})")).unwrap_or_default()
}
