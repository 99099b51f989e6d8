//! File-backed implementations built on `storage::json_map_store`.

pub mod core_store;
