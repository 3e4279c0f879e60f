// Nova backend request and response types.
// Bodies use snake_case keys on the wire.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form JSON object used for properties and user profiles.
pub type Props = Map<String, Value>;

/// Variant assignment returned for one feature.
///
/// Only `config` is kept by the cache; the remaining fields describe how the
/// backend arrived at the assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantResponse {
    #[serde(default)]
    pub feature_id: Option<String>,
    #[serde(default)]
    pub feature_name: Option<String>,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default)]
    pub config: Option<Props>,
    #[serde(default)]
    pub experience_id: Option<String>,
    #[serde(default)]
    pub personalisation_id: Option<String>,
    #[serde(default)]
    pub segment_id: Option<String>,
    #[serde(default)]
    pub evaluation_reason: Option<String>,
}

/// Batch and all-variant responses, keyed by object name.
pub type VariantMap = BTreeMap<String, VariantResponse>;

/// Body for user registration.
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest<'a> {
    pub organisation_id: &'a str,
    pub app_id: &'a str,
    pub user_id: &'a str,
    pub user_profile: &'a Props,
}

/// Registration response carrying the backend-issued user id.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserResponse {
    pub nova_user_id: String,
}

/// Body for a single variant fetch.
#[derive(Debug, Clone, Serialize)]
pub struct VariantRequest<'a> {
    pub organisation_id: &'a str,
    pub app_id: &'a str,
    pub user_id: &'a str,
    pub feature_name: &'a str,
    pub payload: &'a Props,
}

/// Body for a batched variant fetch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchVariantRequest<'a> {
    pub organisation_id: &'a str,
    pub app_id: &'a str,
    pub user_id: &'a str,
    pub feature_names: &'a [String],
    pub payload: &'a Props,
}

/// Body for fetching every variant assigned to a user.
#[derive(Debug, Clone, Serialize)]
pub struct AllVariantsRequest<'a> {
    pub organisation_id: &'a str,
    pub app_id: &'a str,
    pub user_id: &'a str,
    pub payload: &'a Props,
}

/// Body for event tracking.
#[derive(Debug, Clone, Serialize)]
pub struct TrackEventRequest<'a> {
    pub organisation_id: &'a str,
    pub app_id: &'a str,
    pub user_id: &'a str,
    pub event_name: &'a str,
    pub event_data: &'a Value,
    pub timestamp: DateTime<Utc>,
}
