//! SeaORM-backed implementations.

pub mod core_store;
