// Nova backend endpoint functions.
// Provides typed methods for each fixed backend path.

use serde_json::Value;

use crate::config::NovaConfig;
use crate::error::Result;
use crate::user::NovaUser;

use super::client::{NovaClient, join_url};
use super::types::{
    AllVariantsRequest, BatchVariantRequest, CreateUserRequest, CreateUserResponse,
    TrackEventRequest, VariantMap, VariantRequest, VariantResponse,
};

pub const CREATE_USER_PATH: &str = "/api/v1/users/create-user/";
pub const GET_VARIANT_PATH: &str = "/api/v1/user-experience/get-variant/";
pub const GET_VARIANTS_BATCH_PATH: &str = "/api/v1/user-experience/get-variants-batch/";
pub const GET_ALL_VARIANTS_PATH: &str = "/api/v1/user-experience/get-all-variants/";
pub const TRACK_EVENT_PATH: &str = "/api/v1/metrics/track-event/";
pub const SYNC_OBJECTS_PATH: &str = "/api/v1/feature-flags/sync-nova-objects/";

impl NovaClient {
    /// Register a user and return the backend-issued user id.
    pub async fn create_user(&self, config: &NovaConfig, user: &NovaUser) -> Result<String> {
        let body = CreateUserRequest {
            organisation_id: &config.organisation_id,
            app_id: &config.app_id,
            user_id: &user.user_id,
            user_profile: &user.profile,
        };
        let url = join_url(&config.api_endpoint, CREATE_USER_PATH);
        let response: CreateUserResponse = self.post_json(&url, &body).await?;
        Ok(response.nova_user_id)
    }

    /// Fetch the variant assigned to `user` for one object.
    pub async fn get_variant(
        &self,
        config: &NovaConfig,
        user: &NovaUser,
        name: &str,
    ) -> Result<VariantResponse> {
        let body = VariantRequest {
            organisation_id: &config.organisation_id,
            app_id: &config.app_id,
            user_id: user.backend_id(),
            feature_name: name,
            payload: &user.profile,
        };
        let url = join_url(&config.api_endpoint, GET_VARIANT_PATH);
        self.post_json(&url, &body).await
    }

    /// Fetch variants for several objects in one request.
    pub async fn get_variants_batch(
        &self,
        config: &NovaConfig,
        user: &NovaUser,
        names: &[String],
    ) -> Result<VariantMap> {
        let body = BatchVariantRequest {
            organisation_id: &config.organisation_id,
            app_id: &config.app_id,
            user_id: user.backend_id(),
            feature_names: names,
            payload: &user.profile,
        };
        let url = join_url(&config.api_endpoint, GET_VARIANTS_BATCH_PATH);
        self.post_json(&url, &body).await
    }

    /// Fetch every variant the backend knows for `user`.
    pub async fn get_all_variants(&self, config: &NovaConfig, user: &NovaUser) -> Result<VariantMap> {
        let body = AllVariantsRequest {
            organisation_id: &config.organisation_id,
            app_id: &config.app_id,
            user_id: user.backend_id(),
            payload: &user.profile,
        };
        let url = join_url(&config.api_endpoint, GET_ALL_VARIANTS_PATH);
        self.post_json(&url, &body).await
    }

    /// Record a usage event. The response body is ignored.
    pub async fn track_event(
        &self,
        config: &NovaConfig,
        nova_user_id: &str,
        event_name: &str,
        event_data: &Value,
    ) -> Result<()> {
        let body = TrackEventRequest {
            organisation_id: &config.organisation_id,
            app_id: &config.app_id,
            user_id: nova_user_id,
            event_name,
            event_data,
            timestamp: chrono::Utc::now(),
        };
        let url = join_url(&config.api_endpoint, TRACK_EVENT_PATH);
        self.post_discard(&url, &body).await
    }

    /// Push a registry snapshot to the backend.
    ///
    /// Any non-success status is reported as [`NovaError::Sync`] with the
    /// response body so the CLI can show what the backend rejected.
    ///
    /// [`NovaError::Sync`]: crate::error::NovaError::Sync
    pub async fn sync_registry(&self, api_endpoint: &str, payload: &Value) -> Result<Value> {
        let url = join_url(api_endpoint, SYNC_OBJECTS_PATH);
        self.post_registry(&url, payload).await
    }
}
