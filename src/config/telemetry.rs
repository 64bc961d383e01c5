use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::ConfigDocument;

pub fn log_candidate_chosen(path: &Path, candidates: &[PathBuf]) {
    debug!(
        target: "ccode::config",
        path = %path.display(),
        candidates = candidates.len(),
        "Selected configuration file"
    );
}

pub fn log_loaded(document: &ConfigDocument) {
    info!(
        target: "ccode::config",
        path = %document.source_path().display(),
        common_vars = document.common().len(),
        profiles = document.profiles().len(),
        default_profile = %document.default_profile().name,
        "Configuration file loaded successfully"
    );
}
