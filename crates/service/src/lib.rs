//! Service layer for the core store tool.
//! - `store`: the `CoreStore` abstraction plus file, database and mock backends.
//! - `restore`: input loading, merge strategies and the sequential batch driver.
//! - `dump`: paged export of a whole store.

pub mod errors;
pub mod record;
pub mod store;
pub mod runtime;
pub mod pagination;
#[cfg(test)]
pub mod test_support;
pub mod storage;
pub mod db;
pub mod file;
pub mod restore;
pub mod dump;
