//! Remote model catalog and persisted per-profile model selections.
pub mod catalog;
pub mod selection;

pub use catalog::{CatalogEndpoint, ModelCatalog, ModelEntry, MODELS_PATH};
pub use selection::{choose_model, ModelChoice, ModelSlot, SelectionStore, SELECTION_FILE_NAME};
