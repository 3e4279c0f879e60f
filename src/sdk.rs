// Loader facade.
// Fetches variants from the backend and keeps the object cache up to date.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use crate::api::{NovaClient, Props, VariantMap, VariantResponse};
use crate::cache::{Action, Defaults, NovaState, reduce};
use crate::config::{ConfigUpdate, NovaConfig, UserMode};
use crate::error::{NovaError, Result};
use crate::user::NovaUser;

/// Entry point for reading feature variants.
///
/// All state lives in a single [`NovaState`] that is replaced through
/// [`reduce`] on every change. Consumers can either read it on demand or
/// [`subscribe`](Nova::subscribe) to be notified of each change.
#[derive(Debug)]
pub struct Nova {
    client: NovaClient,
    state: watch::Sender<NovaState>,
}

impl Nova {
    /// Create a loader with an empty cache.
    pub fn new(config: NovaConfig) -> Result<Self> {
        Ok(Self::with_client(NovaClient::new()?, NovaState::new(config)))
    }

    /// Create a loader whose cache is seeded from `defaults`.
    pub fn with_defaults(config: NovaConfig, defaults: Defaults) -> Result<Self> {
        Ok(Self::with_client(
            NovaClient::new()?,
            NovaState::with_defaults(config, defaults),
        ))
    }

    /// Create a loader from a prepared client and initial state.
    pub fn with_client(client: NovaClient, state: NovaState) -> Self {
        let (state, _) = watch::channel(state);
        Self { client, state }
    }

    fn dispatch(&self, action: Action) {
        self.state.send_modify(|state| {
            let next = reduce(state, &action);
            *state = next;
        });
    }

    fn record_error(&self, err: &NovaError) {
        tracing::error!(error = %err, "load failed");
        self.dispatch(Action::SetError(Some(err.to_string())));
    }

    /// Mark the loader busy until the returned guard is dropped.
    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.dispatch(Action::SetLoading(true));
        LoadingGuard { nova: self }
    }

    /// Config and user required by every load operation.
    fn load_context(&self) -> Result<(NovaConfig, NovaUser)> {
        let state = self.state.borrow();
        let user = state.user.clone().ok_or_else(NovaError::user_not_set)?;
        let config = state
            .config
            .clone()
            .ok_or_else(|| NovaError::Configuration("configuration is not set".to_string()))?;
        Ok((config, user))
    }

    // ---- configuration and user ----

    /// Shallow-merge `update` into the current configuration.
    pub fn set_config(&self, update: ConfigUpdate) {
        self.dispatch(Action::SetConfig(update));
    }

    pub fn config(&self) -> Option<NovaConfig> {
        self.state.borrow().config.clone()
    }

    /// Set the user variants are evaluated for.
    ///
    /// With [`UserMode::Register`] the user is first registered with the
    /// backend and stored with the issued id. With [`UserMode::Direct`] the
    /// user is stored as given.
    pub async fn set_user(&self, user: NovaUser) -> Result<()> {
        let config = self
            .config()
            .ok_or_else(|| NovaError::Configuration("configuration is not set".to_string()))?;

        let user = match config.user_mode {
            UserMode::Direct => user,
            UserMode::Register => {
                let nova_user_id = self.client.create_user(&config, &user).await?;
                tracing::info!(user_id = %user.user_id, %nova_user_id, "registered user");
                user.with_nova_user_id(nova_user_id)
            }
        };

        self.dispatch(Action::SetUser(user));
        Ok(())
    }

    pub fn user(&self) -> Option<NovaUser> {
        self.state.borrow().user.clone()
    }

    /// Replace defaults of objects already in the cache.
    pub fn set_defaults(&self, defaults: Defaults) {
        self.dispatch(Action::SetDefaults(defaults));
    }

    // ---- loading ----

    /// Fetch one object unless it is already loaded.
    pub async fn load_object(&self, name: &str, force_reload: bool) -> Result<()> {
        let (config, user) = self.load_context()?;

        if !force_reload && self.is_loaded(name) {
            tracing::debug!(name, "object already loaded, skipping fetch");
            return Ok(());
        }

        let _loading = self.begin_loading();
        match self.client.get_variant(&config, &user, name).await {
            Ok(variant) => {
                log_assignment(name, &variant);
                self.dispatch(Action::UpdateObjectProps {
                    name: name.to_string(),
                    props: variant.config,
                    fetched_at: Utc::now(),
                });
                tracing::info!(name, "loaded object");
                Ok(())
            }
            Err(err) => {
                self.record_error(&err);
                Err(err)
            }
        }
    }

    /// Fetch several objects in one request, skipping those already loaded.
    pub async fn load_objects(&self, names: &[&str], force_reload: bool) -> Result<()> {
        let (config, user) = self.load_context()?;

        let mut pending: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !force_reload && self.is_loaded(name) {
                continue;
            }
            if !pending.iter().any(|p| p == name) {
                pending.push(name.to_string());
            }
        }

        if pending.is_empty() {
            tracing::debug!("all requested objects already loaded, skipping fetch");
            return Ok(());
        }

        let _loading = self.begin_loading();
        match self.client.get_variants_batch(&config, &user, &pending).await {
            Ok(variants) => {
                let objects = collect_props(variants, |name| pending.iter().any(|p| p == name));
                tracing::info!(requested = pending.len(), loaded = objects.len(), "loaded objects");
                self.dispatch(Action::SetBulkObjects {
                    objects,
                    fetched_at: Utc::now(),
                });
                Ok(())
            }
            Err(err) => {
                self.record_error(&err);
                Err(err)
            }
        }
    }

    /// Fetch every object the backend has for the current user.
    ///
    /// Skipped when any object has already been loaded, unless forced.
    pub async fn load_all_objects(&self, force_reload: bool) -> Result<()> {
        let (config, user) = self.load_context()?;

        if !force_reload && self.state.borrow().has_loaded_objects() {
            tracing::debug!("objects already loaded, skipping full fetch");
            return Ok(());
        }

        let _loading = self.begin_loading();
        match self.client.get_all_variants(&config, &user).await {
            Ok(variants) => {
                let objects = collect_props(variants, |_| true);
                tracing::info!(loaded = objects.len(), "loaded all objects");
                self.dispatch(Action::SetBulkObjects {
                    objects,
                    fetched_at: Utc::now(),
                });
                Ok(())
            }
            Err(err) => {
                self.record_error(&err);
                Err(err)
            }
        }
    }

    // ---- reading ----

    /// Properties for `name`: fetched when loaded, otherwise defaults.
    ///
    /// Unknown names are logged and yield `None`.
    pub fn read_object(&self, name: &str) -> Option<Props> {
        let state = self.state.borrow();
        match state.objects.get(name) {
            Some(entry) => entry.effective_props().cloned(),
            None => {
                tracing::error!(error = %NovaError::NotFound(name.to_string()), "read of unknown object");
                None
            }
        }
    }

    /// Like [`read_object`](Nova::read_object), deserialized into `T`.
    pub fn get_object<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let props = self.read_object(name)?;
        match serde_json::from_value(Value::Object(props)) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(name, error = %err, "object properties do not match requested type");
                None
            }
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.state.borrow().is_loaded(name)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Message of the most recent load failure.
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.dispatch(Action::SetError(None));
    }

    pub fn last_fetched(&self, name: &str) -> Option<DateTime<Utc>> {
        self.state
            .borrow()
            .objects
            .get(name)
            .and_then(|entry| entry.last_fetched)
    }

    /// Whether `name` was never fetched or was fetched more than `ttl` ago.
    pub fn is_stale(&self, name: &str, ttl: Duration) -> bool {
        self.state
            .borrow()
            .objects
            .get(name)
            .is_none_or(|entry| entry.is_stale(ttl, Utc::now()))
    }

    /// Snapshot of the full state.
    pub fn state(&self) -> NovaState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<NovaState> {
        self.state.subscribe()
    }

    // ---- events ----

    /// Report a usage event.
    ///
    /// Does nothing until the user has a backend id. Failures are logged
    /// and never returned.
    pub async fn track_event(&self, event_name: &str, event_data: Value) {
        let (config, nova_user_id) = {
            let state = self.state.borrow();
            let nova_user_id = state.user.as_ref().and_then(|u| u.nova_user_id.clone());
            match (state.config.clone(), nova_user_id) {
                (Some(config), Some(id)) => (config, id),
                _ => {
                    tracing::debug!(event_name, "no registered user, event dropped");
                    return;
                }
            }
        };

        if let Err(err) = self
            .client
            .track_event(&config, &nova_user_id, event_name, &event_data)
            .await
        {
            tracing::warn!(event_name, error = %err, "failed to track event");
        }
    }
}

/// Clears the shared loading flag when a load finishes or is cancelled.
struct LoadingGuard<'a> {
    nova: &'a Nova,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.nova.dispatch(Action::SetLoading(false));
    }
}

fn collect_props(
    variants: VariantMap,
    keep: impl Fn(&str) -> bool,
) -> BTreeMap<String, Option<Props>> {
    variants
        .into_iter()
        .filter(|(name, _)| keep(name))
        .map(|(name, variant)| {
            log_assignment(&name, &variant);
            (name, variant.config)
        })
        .collect()
}

fn log_assignment(name: &str, variant: &VariantResponse) {
    tracing::debug!(
        name,
        variant = ?variant.variant_name,
        experience = ?variant.experience_id,
        segment = ?variant.segment_id,
        reason = ?variant.evaluation_reason,
        "variant assigned"
    );
}
