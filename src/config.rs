// SDK configuration.
// Identifies the organisation, application, and backend the loader talks to.

use serde::{Deserialize, Serialize};

/// How `set_user` obtains the user record it stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserMode {
    /// Register the user with the backend first and keep the issued id.
    #[default]
    Register,
    /// Store the user as given, without a network round trip.
    Direct,
}

/// Loader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovaConfig {
    pub organisation_id: String,
    pub app_id: String,
    pub api_endpoint: String,
    #[serde(default)]
    pub user_mode: UserMode,
}

impl NovaConfig {
    pub fn new(
        organisation_id: impl Into<String>,
        app_id: impl Into<String>,
        api_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            organisation_id: organisation_id.into(),
            app_id: app_id.into(),
            api_endpoint: api_endpoint.into(),
            user_mode: UserMode::default(),
        }
    }

    pub fn with_user_mode(mut self, user_mode: UserMode) -> Self {
        self.user_mode = user_mode;
        self
    }

    /// Return a copy with every field set in `update` replaced.
    pub fn merged(&self, update: &ConfigUpdate) -> Self {
        Self {
            organisation_id: update
                .organisation_id
                .clone()
                .unwrap_or_else(|| self.organisation_id.clone()),
            app_id: update.app_id.clone().unwrap_or_else(|| self.app_id.clone()),
            api_endpoint: update
                .api_endpoint
                .clone()
                .unwrap_or_else(|| self.api_endpoint.clone()),
            user_mode: update.user_mode.unwrap_or(self.user_mode),
        }
    }
}

/// Partial configuration; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub organisation_id: Option<String>,
    pub app_id: Option<String>,
    pub api_endpoint: Option<String>,
    pub user_mode: Option<UserMode>,
}

impl From<NovaConfig> for ConfigUpdate {
    fn from(config: NovaConfig) -> Self {
        Self {
            organisation_id: Some(config.organisation_id),
            app_id: Some(config.app_id),
            api_endpoint: Some(config.api_endpoint),
            user_mode: Some(config.user_mode),
        }
    }
}
