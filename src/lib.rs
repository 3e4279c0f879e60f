//! Client SDK for nova feature flags.
//!
//! [`Nova`] fetches per-object variant properties from the backend and keeps
//! them in an in-memory cache, falling back to local defaults until a fetch
//! completes. The [`registry`] module backs the `nova-sync` binary, which
//! pushes the local object manifest to the backend.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod registry;
pub mod sdk;
pub mod user;

pub use api::{NovaClient, Props};
pub use cache::{Action, DEFAULT_TTL, NovaState, ObjectEntry, reduce};
pub use config::{ConfigUpdate, NovaConfig, UserMode};
pub use error::{NovaError, Result};
pub use sdk::Nova;
pub use user::NovaUser;
