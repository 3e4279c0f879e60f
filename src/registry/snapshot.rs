// Registry snapshot.
// The manifest plus metadata, written locally and posted to the backend.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

use super::config::RegistryConfig;
use super::manifest::Manifest;

pub const DEFAULT_OUTPUT: &str = "nova-registry.json";

/// Version stamped into every snapshot.
pub const REGISTRY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Derived registry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub objects: Map<String, Value>,
    pub experiences: Map<String, Value>,
    pub metadata: RegistryMetadata,
}

/// Describes when and for whom a snapshot was generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryMetadata {
    pub generated_at: DateTime<Utc>,
    pub organisation_id: String,
    pub app_id: String,
    pub version: String,
    pub object_count: usize,
    pub experience_count: usize,
}

impl RegistrySnapshot {
    pub fn new(manifest: Manifest, config: &RegistryConfig, generated_at: DateTime<Utc>) -> Self {
        let metadata = RegistryMetadata {
            generated_at,
            organisation_id: config.organisation_id.clone(),
            app_id: config.app_id.clone(),
            version: REGISTRY_VERSION.to_string(),
            object_count: manifest.objects.len(),
            experience_count: manifest.experiences.len(),
        };

        Self {
            objects: manifest.objects,
            experiences: manifest.experiences,
            metadata,
        }
    }
}

/// Write the snapshot as pretty JSON, atomically via a temp file.
pub fn write_snapshot(path: &Path, snapshot: &RegistrySnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn config() -> RegistryConfig {
        RegistryConfig {
            organisation_id: "org".to_string(),
            app_id: "app".to_string(),
            api_key: "key".to_string(),
            api_endpoint: "http://localhost".to_string(),
        }
    }

    fn manifest() -> Manifest {
        Manifest {
            objects: json!({"x": {"color": "red"}, "y": {}}).as_object().cloned().unwrap(),
            experiences: json!({"onboarding": {"objects": ["x"]}})
                .as_object()
                .cloned()
                .unwrap(),
        }
    }

    #[test]
    fn test_metadata_counts() {
        let snapshot = RegistrySnapshot::new(manifest(), &config(), Utc::now());
        assert_eq!(snapshot.metadata.object_count, 2);
        assert_eq!(snapshot.metadata.experience_count, 1);
        assert_eq!(snapshot.metadata.organisation_id, "org");
        assert_eq!(snapshot.metadata.version, REGISTRY_VERSION);
    }

    #[test]
    fn test_metadata_keys_are_camel_case() {
        let snapshot = RegistrySnapshot::new(manifest(), &config(), Utc::now());
        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value["metadata"].get("generatedAt").is_some());
        assert!(value["metadata"].get("objectCount").is_some());
    }

    #[test]
    fn test_write_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(DEFAULT_OUTPUT);
        let snapshot = RegistrySnapshot::new(manifest(), &config(), Utc::now());

        write_snapshot(&path, &snapshot).unwrap();

        let written: RegistrySnapshot =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, snapshot);
        assert!(!path.with_extension("tmp").exists());
    }
}
