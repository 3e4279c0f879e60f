// State transitions for the object cache.
// Every change to NovaState goes through `reduce`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::api::Props;
use crate::config::ConfigUpdate;
use crate::user::NovaUser;

use super::store::{NovaState, ObjectEntry};

/// A single state change.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Shallow-merge into the configuration.
    SetConfig(ConfigUpdate),
    /// Replace the user.
    SetUser(NovaUser),
    /// Replace defaults of objects already present in the cache.
    /// Names that have no entry are ignored.
    SetDefaults(BTreeMap<String, Props>),
    /// Store fetched properties for one object and mark it loaded.
    UpdateObjectProps {
        name: String,
        props: Option<Props>,
        fetched_at: DateTime<Utc>,
    },
    /// Store fetched properties for several objects at once.
    SetBulkObjects {
        objects: BTreeMap<String, Option<Props>>,
        fetched_at: DateTime<Utc>,
    },
    SetLoading(bool),
    SetError(Option<String>),
}

/// Apply `action` to `state`, returning the next state.
pub fn reduce(state: &NovaState, action: &Action) -> NovaState {
    let mut next = state.clone();

    match action {
        Action::SetConfig(update) => {
            let current = next.config.take().unwrap_or_default();
            next.config = Some(current.merged(update));
        }
        Action::SetUser(user) => {
            next.user = Some(user.clone());
        }
        Action::SetDefaults(defaults) => {
            for (name, entry) in next.objects.iter_mut() {
                if let Some(props) = defaults.get(name) {
                    entry.defaults = Some(props.clone());
                }
            }
        }
        Action::UpdateObjectProps {
            name,
            props,
            fetched_at,
        } => {
            mark_loaded(next.objects.entry(name.clone()).or_default(), props, *fetched_at);
        }
        Action::SetBulkObjects {
            objects,
            fetched_at,
        } => {
            for (name, props) in objects {
                mark_loaded(next.objects.entry(name.clone()).or_default(), props, *fetched_at);
            }
        }
        Action::SetLoading(loading) => {
            next.loading = *loading;
        }
        Action::SetError(error) => {
            next.error = error.clone();
        }
    }

    next
}

fn mark_loaded(entry: &mut ObjectEntry, props: &Option<Props>, fetched_at: DateTime<Utc>) {
    entry.props = props.clone();
    entry.is_loaded = true;
    entry.last_fetched = Some(fetched_at);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NovaConfig;
    use serde_json::json;

    fn props(value: serde_json::Value) -> Props {
        value.as_object().cloned().unwrap()
    }

    fn seeded_state() -> NovaState {
        let mut defaults = BTreeMap::new();
        defaults.insert("banner".to_string(), props(json!({"text": "hello"})));
        defaults.insert("checkout".to_string(), props(json!({"color": "red"})));
        NovaState::with_defaults(NovaConfig::new("org", "app", "http://localhost"), defaults)
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = seeded_state();
        let before = state.clone();
        let action = Action::UpdateObjectProps {
            name: "banner".to_string(),
            props: Some(props(json!({"text": "bonjour"}))),
            fetched_at: Utc::now(),
        };

        let first = reduce(&state, &action);
        let second = reduce(&state, &action);

        assert_eq!(first, second);
        assert_eq!(state, before);
        assert_ne!(first, state);
    }

    #[test]
    fn test_update_single_object() {
        let fetched_at = Utc::now();
        let next = reduce(
            &seeded_state(),
            &Action::UpdateObjectProps {
                name: "checkout".to_string(),
                props: Some(props(json!({"color": "green"}))),
                fetched_at,
            },
        );

        let entry = &next.objects["checkout"];
        assert!(entry.is_loaded);
        assert_eq!(entry.last_fetched, Some(fetched_at));
        assert_eq!(entry.props.as_ref().unwrap()["color"], "green");
        assert_eq!(entry.defaults.as_ref().unwrap()["color"], "red");
        assert!(!next.objects["banner"].is_loaded);
    }

    #[test]
    fn test_update_creates_missing_entry() {
        let next = reduce(
            &NovaState::default(),
            &Action::UpdateObjectProps {
                name: "new".to_string(),
                props: None,
                fetched_at: Utc::now(),
            },
        );
        assert!(next.is_loaded("new"));
        assert!(next.objects["new"].defaults.is_none());
    }

    #[test]
    fn test_bulk_update_marks_all_loaded() {
        let mut objects = BTreeMap::new();
        objects.insert("banner".to_string(), Some(props(json!({"text": "a"}))));
        objects.insert("checkout".to_string(), Some(props(json!({"color": "b"}))));

        let next = reduce(
            &seeded_state(),
            &Action::SetBulkObjects {
                objects,
                fetched_at: Utc::now(),
            },
        );

        assert!(next.is_loaded("banner"));
        assert!(next.is_loaded("checkout"));
        assert_eq!(
            next.objects["banner"].last_fetched,
            next.objects["checkout"].last_fetched
        );
    }

    #[test]
    fn test_set_defaults_only_touches_existing_entries() {
        let mut defaults = BTreeMap::new();
        defaults.insert("banner".to_string(), props(json!({"text": "updated"})));
        defaults.insert("unknown".to_string(), props(json!({"x": 1})));

        let next = reduce(&seeded_state(), &Action::SetDefaults(defaults.clone()));
        assert_eq!(next.objects["banner"].defaults.as_ref().unwrap()["text"], "updated");
        assert!(!next.objects.contains_key("unknown"));

        // An empty cache stays empty.
        let empty = reduce(&NovaState::default(), &Action::SetDefaults(defaults));
        assert!(empty.objects.is_empty());
    }

    #[test]
    fn test_set_config_merges() {
        let next = reduce(
            &seeded_state(),
            &Action::SetConfig(ConfigUpdate {
                app_id: Some("other-app".to_string()),
                ..Default::default()
            }),
        );
        let config = next.config.unwrap();
        assert_eq!(config.organisation_id, "org");
        assert_eq!(config.app_id, "other-app");
    }

    #[test]
    fn test_set_config_without_existing_config() {
        let next = reduce(
            &NovaState::default(),
            &Action::SetConfig(ConfigUpdate {
                organisation_id: Some("org".to_string()),
                ..Default::default()
            }),
        );
        let config = next.config.unwrap();
        assert_eq!(config.organisation_id, "org");
        assert!(config.app_id.is_empty());
    }

    #[test]
    fn test_set_user_replaces() {
        let state = reduce(&seeded_state(), &Action::SetUser(NovaUser::new("a").with_nova_user_id("n")));
        let next = reduce(&state, &Action::SetUser(NovaUser::new("b")));
        let user = next.user.unwrap();
        assert_eq!(user.user_id, "b");
        assert!(user.nova_user_id.is_none());
    }

    #[test]
    fn test_loading_and_error() {
        let next = reduce(&seeded_state(), &Action::SetLoading(true));
        assert!(next.loading);
        let next = reduce(&next, &Action::SetError(Some("boom".to_string())));
        assert_eq!(next.error.as_deref(), Some("boom"));
        let next = reduce(&next, &Action::SetLoading(false));
        assert!(!next.loading);
        assert_eq!(next.error.as_deref(), Some("boom"));
    }
}
