// Local object manifest.
// Declares the objects and experiences an application registers with the backend.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{NovaError, Result};

pub const DEFAULT_MANIFEST: &str = "nova-objects.json";

/// Validated manifest contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub objects: Map<String, Value>,
    pub experiences: Map<String, Value>,
}

/// Parse and validate manifest JSON. `source` names the input in errors.
pub fn parse_manifest(json: &str, source: &str) -> Result<Manifest> {
    let root: Value = serde_json::from_str(json).map_err(|e| {
        NovaError::Configuration(format!("{} is not valid JSON: {}", source, e))
    })?;

    let Value::Object(mut root) = root else {
        return Err(NovaError::Configuration(format!(
            "{} must contain a JSON object",
            source
        )));
    };

    let objects = take_section(&mut root, "objects", source)?;
    let experiences = take_section(&mut root, "experiences", source)?;

    Ok(Manifest {
        objects,
        experiences,
    })
}

/// Read and validate the manifest at `path`.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(NovaError::Configuration(format!(
            "manifest not found at {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path)?;
    parse_manifest(&contents, &path.display().to_string())
}

fn take_section(root: &mut Map<String, Value>, key: &str, source: &str) -> Result<Map<String, Value>> {
    match root.remove(key) {
        Some(Value::Object(section)) => Ok(section),
        Some(_) => Err(NovaError::Configuration(format!(
            "\"{}\" in {} must be an object",
            key, source
        ))),
        None => Err(NovaError::Configuration(format!(
            "{} is missing the \"{}\" section",
            source, key
        ))),
    }
}
