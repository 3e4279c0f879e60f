// Registry sync module.
// Pushes the local object manifest to the backend registry.

pub mod config;
pub mod manifest;
pub mod snapshot;
pub mod sync;

pub use config::RegistryConfig;
pub use manifest::{Manifest, parse_manifest, read_manifest};
pub use snapshot::{RegistryMetadata, RegistrySnapshot, write_snapshot};
pub use sync::{SyncOptions, SyncReport, run_sync};
