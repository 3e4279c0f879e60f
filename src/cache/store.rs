// In-memory object cache.
// Holds default and fetched properties per object with fetch timestamps.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::Props;
use crate::config::NovaConfig;
use crate::user::NovaUser;

/// Default TTL used by staleness checks: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache entry for one named object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Properties from the defaults resource.
    pub defaults: Option<Props>,
    /// Properties from the most recent fetch.
    pub props: Option<Props>,
    /// Whether a fetch has completed for this object.
    pub is_loaded: bool,
    /// When the most recent fetch completed.
    pub last_fetched: Option<DateTime<Utc>>,
}

impl ObjectEntry {
    /// Create an unloaded entry with the given defaults.
    pub fn from_defaults(defaults: Props) -> Self {
        Self {
            defaults: Some(defaults),
            ..Default::default()
        }
    }

    /// Fetched properties when loaded, otherwise defaults.
    pub fn effective_props(&self) -> Option<&Props> {
        match (self.is_loaded, &self.props) {
            (true, Some(props)) => Some(props),
            _ => self.defaults.as_ref(),
        }
    }

    /// Check whether the last fetch is older than `ttl` at `now`.
    /// Entries that were never fetched are always stale.
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let Some(fetched) = self.last_fetched.filter(|_| self.is_loaded) else {
            return true;
        };

        let elapsed = now
            .signed_duration_since(fetched)
            .to_std()
            .unwrap_or(Duration::ZERO);

        elapsed > ttl
    }
}

/// Mapping from object name to its cache entry.
pub type ObjectMap = BTreeMap<String, ObjectEntry>;

/// Complete loader state. Only changed through [`reduce`](super::reduce).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NovaState {
    pub config: Option<NovaConfig>,
    pub user: Option<NovaUser>,
    pub objects: ObjectMap,
    /// Shared across all objects; set while any load is in flight.
    pub loading: bool,
    /// Message of the most recent load failure.
    pub error: Option<String>,
}

impl NovaState {
    pub fn new(config: NovaConfig) -> Self {
        Self {
            config: Some(config),
            ..Default::default()
        }
    }

    /// Seed the cache with one unloaded entry per default object.
    pub fn with_defaults(config: NovaConfig, defaults: BTreeMap<String, Props>) -> Self {
        let objects = defaults
            .into_iter()
            .map(|(name, props)| (name, ObjectEntry::from_defaults(props)))
            .collect();

        Self {
            config: Some(config),
            objects,
            ..Default::default()
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.objects.get(name).is_some_and(|entry| entry.is_loaded)
    }

    /// Whether any entry has completed a fetch.
    pub fn has_loaded_objects(&self) -> bool {
        self.objects.values().any(|entry| entry.is_loaded)
    }
}
