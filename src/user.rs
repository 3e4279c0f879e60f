// User identity attached to every variant request.

use serde::{Deserialize, Serialize};

use crate::api::Props;

/// The user variants are evaluated for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NovaUser {
    /// Caller-supplied identifier.
    pub user_id: String,
    /// Free-form attributes forwarded to the backend for targeting.
    #[serde(default)]
    pub profile: Props,
    /// Identifier issued by the backend at registration.
    #[serde(default)]
    pub nova_user_id: Option<String>,
}

impl NovaUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn with_profile(mut self, profile: Props) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_nova_user_id(mut self, nova_user_id: impl Into<String>) -> Self {
        self.nova_user_id = Some(nova_user_id.into());
        self
    }

    /// Id sent to variant endpoints: the backend id when registered.
    pub fn backend_id(&self) -> &str {
        self.nova_user_id.as_deref().unwrap_or(&self.user_id)
    }
}
