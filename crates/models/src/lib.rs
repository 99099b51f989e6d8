pub mod errors;
pub mod db;
pub mod core_store;
