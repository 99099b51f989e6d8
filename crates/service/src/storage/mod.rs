//! On-disk building blocks shared by the file-backed stores.

pub mod json_map_store;
