//! Shared runtime helpers for the corestore workspace.
//! - `utils::logging`: tracing subscriber setup used by every binary.
//! - `env`: startup sanity checks for on-disk locations.

pub mod utils;
pub mod env;
