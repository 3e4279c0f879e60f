// Object cache module.
// Holds fetched variant properties in memory and the reducer that updates them.

pub mod defaults;
pub mod reducer;
pub mod store;

pub use defaults::{Defaults, fetch_defaults, parse_defaults, read_defaults};
pub use reducer::{Action, reduce};
pub use store::{DEFAULT_TTL, NovaState, ObjectEntry, ObjectMap};
