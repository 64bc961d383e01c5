//! Per-profile model choices persisted as JSON.
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::lib::{errors::SelectionError, fs::write_atomic};

use super::catalog::ModelCatalog;

/// File name inside the per-user state directory.
pub const SELECTION_FILE_NAME: &str = "selections.json";

/// Model alias slots the launched tool understands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ModelSlot {
    Opus,
    Sonnet,
    Haiku,
}

impl ModelSlot {
    pub const ALL: [ModelSlot; 3] = [ModelSlot::Opus, ModelSlot::Sonnet, ModelSlot::Haiku];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ModelSlot::Opus => "opus",
            ModelSlot::Sonnet => "sonnet",
            ModelSlot::Haiku => "haiku",
        }
    }

    /// Environment variable that carries this slot's model id.
    pub const fn env_key(&self) -> &'static str {
        match self {
            ModelSlot::Opus => "ANTHROPIC_DEFAULT_OPUS_MODEL",
            ModelSlot::Sonnet => "ANTHROPIC_DEFAULT_SONNET_MODEL",
            ModelSlot::Haiku => "ANTHROPIC_DEFAULT_HAIKU_MODEL",
        }
    }
}

/// A model picked for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelChoice {
    pub owned_by: String,
    pub id: String,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SelectionFile {
    #[serde(default)]
    profiles: BTreeMap<String, BTreeMap<ModelSlot, ModelChoice>>,
}

/// In-memory view of the selection file.
#[derive(Debug)]
pub struct SelectionStore {
    path: PathBuf,
    file: SelectionFile,
}

impl SelectionStore {
    /// Read the selection file. A missing file is an empty store; an unreadable
    /// or invalid one is logged and treated as empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                warn!(
                    target: "ccode::models",
                    path = %path.display(),
                    reason = %err,
                    "Ignoring invalid selection file"
                );
                SelectionFile::default()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => SelectionFile::default(),
            Err(err) => {
                warn!(
                    target: "ccode::models",
                    path = %path.display(),
                    reason = %err,
                    "Failed to read selection file"
                );
                SelectionFile::default()
            }
        };
        Self { path, file }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, profile: &str, slot: ModelSlot) -> Option<&ModelChoice> {
        self.file.profiles.get(profile)?.get(&slot)
    }

    pub fn set(&mut self, profile: &str, slot: ModelSlot, choice: ModelChoice) {
        self.file
            .profiles
            .entry(profile.to_string())
            .or_default()
            .insert(slot, choice);
    }

    /// Remove a slot; returns whether something was stored.
    pub fn clear(&mut self, profile: &str, slot: ModelSlot) -> bool {
        let Some(slots) = self.file.profiles.get_mut(profile) else {
            return false;
        };
        let removed = slots.remove(&slot).is_some();
        if slots.is_empty() {
            self.file.profiles.remove(profile);
        }
        removed
    }

    /// Drop choices the catalog no longer offers; returns whether anything changed.
    pub fn prune(&mut self, profile: &str, catalog: &ModelCatalog) -> bool {
        let Some(slots) = self.file.profiles.get_mut(profile) else {
            return false;
        };
        let before = slots.len();
        slots.retain(|_, choice| catalog.contains(&choice.owned_by, &choice.id));
        let changed = slots.len() != before;
        if slots.is_empty() {
            self.file.profiles.remove(profile);
        }
        changed
    }

    /// `(ANTHROPIC_DEFAULT_*_MODEL, id)` pairs for a profile's stored choices.
    pub fn overrides(&self, profile: &str) -> Vec<(String, String)> {
        self.file
            .profiles
            .get(profile)
            .map(|slots| {
                slots
                    .iter()
                    .map(|(slot, choice)| (slot.env_key().to_string(), choice.id.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Write the store back to its file.
    pub fn save(&self) -> Result<(), SelectionError> {
        let mut serialized = serde_json::to_string_pretty(&self.file)?;
        serialized.push('\n');
        write_atomic(&self.path, serialized.as_bytes()).map_err(|source| SelectionError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(
            target: "ccode::models",
            path = %self.path.display(),
            profiles = self.file.profiles.len(),
            "Saved model selections"
        );
        Ok(())
    }
}

/// Find `id` in the catalog. The owner is inferred when only one offers it.
pub fn choose_model(
    catalog: &ModelCatalog,
    id: &str,
    owner: Option<&str>,
) -> Result<ModelChoice, SelectionError> {
    if let Some(owner) = owner {
        if catalog.contains(owner, id) {
            return Ok(ModelChoice {
                owned_by: owner.to_string(),
                id: id.to_string(),
            });
        }
        return Err(SelectionError::UnknownModel { id: id.to_string() });
    }

    let mut owners = catalog.owners_of(id);
    match owners.len() {
        0 => Err(SelectionError::UnknownModel { id: id.to_string() }),
        1 => Ok(ModelChoice {
            owned_by: owners.remove(0),
            id: id.to_string(),
        }),
        _ => Err(SelectionError::AmbiguousModel {
            id: id.to_string(),
            owners,
        }),
    }
}
