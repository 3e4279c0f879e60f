// Error types for the nova SDK.
// Covers transport failures, loader preconditions, and registry sync errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NovaError {
    #[error("HTTP {status}: {status_text}")]
    Transport { status: u16, status_text: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Registry sync rejected (HTTP {status}): {body}")]
    Sync { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl NovaError {
    /// Error returned by load operations when no user has been set.
    pub fn user_not_set() -> Self {
        NovaError::Precondition("user must be set before loading objects".to_string())
    }
}

pub type Result<T> = std::result::Result<T, NovaError>;
