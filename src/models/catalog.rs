//! Fetch and group the model identifiers an endpoint offers.
use std::{collections::BTreeMap, fmt, time::Duration};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{
    environment::{mask_secret, EffectiveEnvironment, AUTH_TOKEN_KEY},
    lib::errors::CatalogError,
};

/// Path appended to the profile's base URL.
pub const MODELS_PATH: &str = "/v1/models";
/// Variable holding the endpoint base URL.
pub const BASE_URL_KEY: &str = "ANTHROPIC_BASE_URL";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of characters of an error body echoed back.
const BODY_EXCERPT_LIMIT: usize = 200;

/// One model offered by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub owned_by: String,
}

/// Models returned by one catalog request, in response order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

impl ModelCatalog {
    pub fn new(entries: Vec<ModelEntry>) -> Self {
        Self { entries }
    }

    /// Parse a `{"data": [{"id": ..., "owned_by": ...}, ...]}` payload.
    ///
    /// Items that are not objects or lack string `id`/`owned_by` are skipped.
    pub fn from_json(body: &[u8]) -> Result<Self, CatalogError> {
        let payload: Value = serde_json::from_slice(body).map_err(CatalogError::InvalidJson)?;
        let data = payload
            .get("data")
            .and_then(Value::as_array)
            .ok_or(CatalogError::MissingData)?;

        let entries = data
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|item| {
                let id = item.get("id")?.as_str()?;
                let owned_by = item.get("owned_by")?.as_str()?;
                Some(ModelEntry {
                    id: id.to_string(),
                    owned_by: owned_by.to_string(),
                })
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owner → model ids, both sorted.
    pub fn by_owner(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in &self.entries {
            grouped
                .entry(entry.owned_by.clone())
                .or_default()
                .push(entry.id.clone());
        }
        for ids in grouped.values_mut() {
            ids.sort();
        }
        grouped
    }

    pub fn contains(&self, owned_by: &str, id: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.owned_by == owned_by && entry.id == id)
    }

    /// Sorted, de-duplicated owners offering `id`.
    pub fn owners_of(&self, id: &str) -> Vec<String> {
        let mut owners: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.id == id)
            .map(|entry| entry.owned_by.clone())
            .collect();
        owners.sort();
        owners.dedup();
        owners
    }
}

/// Where and how to ask for the model list.
#[derive(Clone)]
pub struct CatalogEndpoint {
    base_url: String,
    token: String,
}

impl fmt::Debug for CatalogEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEndpoint")
            .field("base_url", &self.base_url)
            .field("token", &mask_secret(&self.token))
            .finish()
    }
}

impl CatalogEndpoint {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Take the base URL and token from a resolved profile.
    pub fn from_environment(
        profile: &str,
        environment: &EffectiveEnvironment,
    ) -> Result<Self, CatalogError> {
        let missing = || CatalogError::MissingCredentials {
            profile: profile.to_string(),
        };
        let base_url = environment
            .get(BASE_URL_KEY)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(missing)?;
        let token = environment
            .get(AUTH_TOKEN_KEY)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(missing)?;
        Ok(Self::new(base_url, token))
    }

    pub fn models_url(&self) -> String {
        format!("{}{MODELS_PATH}", self.base_url.trim_end_matches('/'))
    }

    /// Request the model list.
    pub async fn fetch(&self) -> Result<ModelCatalog, CatalogError> {
        let url = self.models_url();
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let response = client.get(&url).bearer_auth(&self.token).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(CatalogError::Http {
                status: status.as_u16(),
                body: body_excerpt(&body),
            });
        }

        let catalog = ModelCatalog::from_json(&body)?;
        info!(
            target: "ccode::models",
            url = %url,
            models = catalog.entries().len(),
            "Fetched model catalog"
        );
        Ok(catalog)
    }
}

/// Trimmed response text, shortened for diagnostics.
fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return "No response body".to_string();
    }
    if text.chars().count() > BODY_EXCERPT_LIMIT {
        let head: String = text.chars().take(BODY_EXCERPT_LIMIT).collect();
        return format!("{head}...");
    }
    text.to_string()
}
