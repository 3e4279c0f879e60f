// Registry sync.
// Validates the manifest, writes the snapshot, then posts it to the backend.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;

use crate::api::NovaClient;
use crate::error::Result;

use super::config::RegistryConfig;
use super::manifest::{DEFAULT_MANIFEST, read_manifest};
use super::snapshot::{DEFAULT_OUTPUT, RegistrySnapshot, write_snapshot};

/// Where the sync reads from and writes to.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Project directory; relative paths below resolve against it.
    pub project_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub output_path: PathBuf,
}

impl SyncOptions {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }
}

/// Outcome of a successful sync.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub output_path: PathBuf,
    pub object_count: usize,
    pub experience_count: usize,
    /// Parsed backend response, `Null` when the body was empty.
    pub response: Value,
}

/// Run the full sync for an already-resolved configuration.
pub async fn run_sync(options: &SyncOptions, config: &RegistryConfig) -> Result<SyncReport> {
    let manifest_path = options.resolve(&options.manifest_path);
    let output_path = options.resolve(&options.output_path);

    let manifest = read_manifest(&manifest_path)?;
    tracing::info!(
        path = %manifest_path.display(),
        objects = manifest.objects.len(),
        experiences = manifest.experiences.len(),
        "validated manifest"
    );

    let snapshot = RegistrySnapshot::new(manifest, config, Utc::now());
    write_snapshot(&output_path, &snapshot)?;
    tracing::info!(path = %output_path.display(), "wrote registry snapshot");

    let payload = serde_json::to_value(&snapshot)?;
    let client = NovaClient::with_api_key(&config.api_key)?;
    let response = client.sync_registry(&config.api_endpoint, &payload).await?;
    tracing::info!(endpoint = %config.api_endpoint, "registry synced");

    Ok(SyncReport {
        output_path,
        object_count: snapshot.metadata.object_count,
        experience_count: snapshot.metadata.experience_count,
        response,
    })
}
