// Registry credentials.
// Resolved from environment variables, `.novarc`, and the `nova` block of
// `package.json`, each layer overriding the one before it.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{NovaError, Result};

pub const RC_FILE: &str = ".novarc";
pub const PACKAGE_FILE: &str = "package.json";
pub const DEFAULT_API_ENDPOINT: &str = "https://api.nova.local";

pub const ENV_ORGANISATION_ID: &str = "NOVA_ORGANISATION_ID";
pub const ENV_APP_ID: &str = "NOVA_APP_ID";
pub const ENV_API_KEY: &str = "NOVA_API_KEY";
pub const ENV_API_ENDPOINT: &str = "NOVA_API_ENDPOINT";

/// Credentials and backend location used by the sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub organisation_id: String,
    pub app_id: String,
    pub api_key: String,
    pub api_endpoint: String,
}

/// One source of settings; unset fields defer to earlier layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigLayer {
    organisation_id: Option<String>,
    app_id: Option<String>,
    api_key: Option<String>,
    api_endpoint: Option<String>,
}

impl ConfigLayer {
    fn from_env(env: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            organisation_id: env(ENV_ORGANISATION_ID),
            app_id: env(ENV_APP_ID),
            api_key: env(ENV_API_KEY),
            api_endpoint: env(ENV_API_ENDPOINT),
        }
    }

    fn from_rc_file(dir: &Path) -> Result<Self> {
        let path = dir.join(RC_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        serde_json::from_str(&contents).map_err(|e| {
            NovaError::Configuration(format!("{} is not valid JSON: {}", path.display(), e))
        })
    }

    fn from_package_json(dir: &Path) -> Result<Self> {
        let path = dir.join(PACKAGE_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let package: Value = serde_json::from_str(&contents).map_err(|e| {
            NovaError::Configuration(format!("{} is not valid JSON: {}", path.display(), e))
        })?;

        match package.get("nova") {
            Some(block) => serde_json::from_value(block.clone()).map_err(|e| {
                NovaError::Configuration(format!(
                    "\"nova\" block in {} is invalid: {}",
                    path.display(),
                    e
                ))
            }),
            None => Ok(Self::default()),
        }
    }

    /// Fields set (and non-empty) in `other` win.
    fn overlay(self, other: Self) -> Self {
        fn pick(base: Option<String>, over: Option<String>) -> Option<String> {
            over.filter(|v| !v.trim().is_empty()).or(base)
        }

        Self {
            organisation_id: pick(self.organisation_id, other.organisation_id),
            app_id: pick(self.app_id, other.app_id),
            api_key: pick(self.api_key, other.api_key),
            api_endpoint: pick(self.api_endpoint, other.api_endpoint),
        }
    }
}

impl RegistryConfig {
    /// Resolve settings for the project in `dir`, reading variables through `env`.
    pub fn resolve(dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let layer = ConfigLayer::from_env(&env)
            .overlay(ConfigLayer::from_rc_file(dir)?)
            .overlay(ConfigLayer::from_package_json(dir)?);

        let mut missing = Vec::new();
        let organisation_id = required(layer.organisation_id, "organisationId", &mut missing);
        let app_id = required(layer.app_id, "appId", &mut missing);
        let api_key = required(layer.api_key, "apiKey", &mut missing);

        if !missing.is_empty() {
            return Err(NovaError::Configuration(format!(
                "missing {}; set {}, {}, {} or add them to {} or the \"nova\" block of {}",
                missing.join(", "),
                ENV_ORGANISATION_ID,
                ENV_APP_ID,
                ENV_API_KEY,
                RC_FILE,
                PACKAGE_FILE
            )));
        }

        Ok(Self {
            organisation_id,
            app_id,
            api_key,
            api_endpoint: layer
                .api_endpoint
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
        })
    }

    /// Resolve using the process environment.
    pub fn from_process_env(dir: &Path) -> Result<Self> {
        Self::resolve(dir, |key| std::env::var(key).ok())
    }
}

fn required(value: Option<String>, key: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(v) => v,
        None => {
            missing.push(key);
            String::new()
        }
    }
}
