// Default object properties.
// Reads the static `{"features": {...}}` document that seeds the cache.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::api::{NovaClient, Props};
use crate::error::Result;

/// Default properties keyed by object name.
pub type Defaults = BTreeMap<String, Props>;

#[derive(Debug, Deserialize)]
struct DefaultsDocument {
    #[serde(default)]
    features: Defaults,
}

/// Parse a defaults document.
pub fn parse_defaults(json: &str) -> Result<Defaults> {
    let document: DefaultsDocument = serde_json::from_str(json)?;
    Ok(document.features)
}

/// Read a defaults document from disk.
pub fn read_defaults(path: &Path) -> Result<Defaults> {
    let contents = fs::read_to_string(path)?;
    parse_defaults(&contents)
}

/// Fetch a defaults document served over HTTP.
pub async fn fetch_defaults(client: &NovaClient, url: &str) -> Result<Defaults> {
    let document: DefaultsDocument = client.get_json(url).await?;
    tracing::debug!(url, count = document.features.len(), "fetched defaults");
    Ok(document.features)
}
