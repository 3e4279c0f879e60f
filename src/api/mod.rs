// Nova backend API module.
// Provides the JSON transport and typed endpoint calls.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::NovaClient;
pub use types::*;
