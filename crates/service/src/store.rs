use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::record::{ConfigRecord, KeyFilter};

/// Trait abstraction for the core store collection.
/// Implementations can be file-backed, database-backed, or in-memory.
/// Each call is an independent single-key operation; there are no
/// cross-key transactions.
#[async_trait]
pub trait CoreStore: Send + Sync {
    /// Name of the collection this store reconciles against.
    fn collection(&self) -> &str;

    async fn count(&self, filter: &KeyFilter) -> Result<u64, ServiceError>;
    async fn find(&self, filter: &KeyFilter) -> Result<Option<ConfigRecord>, ServiceError>;
    /// Fails when an entry with the same key already exists.
    async fn create(&self, record: &ConfigRecord) -> Result<(), ServiceError>;
    /// Replaces the full payload of the entry matching `filter`.
    async fn update(&self, filter: &KeyFilter, record: &ConfigRecord) -> Result<(), ServiceError>;

    async fn count_all(&self) -> Result<u64, ServiceError>;
    /// Entries ordered by key.
    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<ConfigRecord>, ServiceError>;
}

/// In-memory store that records every call, for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum StoreCall {
        Count(String),
        Find(String),
        Create(String),
        Update(String),
        CountAll,
        ListPage { offset: u64, limit: u64 },
    }

    impl StoreCall {
        pub fn is_write(&self) -> bool {
            matches!(self, StoreCall::Create(_) | StoreCall::Update(_))
        }
    }

    #[derive(Default)]
    pub struct RecordingStore {
        entries: Mutex<BTreeMap<String, ConfigRecord>>,
        calls: Mutex<Vec<StoreCall>>,
        failing_keys: Mutex<HashSet<String>>,
    }

    impl RecordingStore {
        pub fn new() -> Self { Self::default() }

        /// Seed entries without recording calls.
        pub fn with_entries(records: impl IntoIterator<Item = ConfigRecord>) -> Self {
            let store = Self::default();
            {
                let mut entries = store.entries.lock().unwrap();
                for r in records {
                    entries.insert(r.key().to_string(), r);
                }
            }
            store
        }

        /// Every store call touching `key` fails from now on.
        pub fn fail_on(&self, key: &str) {
            self.failing_keys.lock().unwrap().insert(key.to_string());
        }

        pub fn calls(&self) -> Vec<StoreCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn get(&self, key: &str) -> Option<ConfigRecord> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        pub fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn record(&self, call: StoreCall, key: Option<&str>) -> Result<(), ServiceError> {
            self.calls.lock().unwrap().push(call);
            match key {
                Some(k) if self.failing_keys.lock().unwrap().contains(k) => {
                    Err(ServiceError::Db(format!("injected failure for key {k:?}")))
                }
                _ => Ok(()),
            }
        }
    }

    #[async_trait]
    impl CoreStore for RecordingStore {
        fn collection(&self) -> &str { "core_store" }

        async fn count(&self, filter: &KeyFilter) -> Result<u64, ServiceError> {
            self.record(StoreCall::Count(filter.key.clone()), Some(&filter.key))?;
            Ok(self.entries.lock().unwrap().contains_key(&filter.key) as u64)
        }

        async fn find(&self, filter: &KeyFilter) -> Result<Option<ConfigRecord>, ServiceError> {
            self.record(StoreCall::Find(filter.key.clone()), Some(&filter.key))?;
            Ok(self.entries.lock().unwrap().get(&filter.key).cloned())
        }

        async fn create(&self, record: &ConfigRecord) -> Result<(), ServiceError> {
            self.record(StoreCall::Create(record.key().to_string()), Some(record.key()))?;
            let mut entries = self.entries.lock().unwrap();
            if entries.contains_key(record.key()) {
                return Err(ServiceError::Conflict(format!("key {:?} already exists", record.key())));
            }
            entries.insert(record.key().to_string(), record.clone());
            Ok(())
        }

        async fn update(&self, filter: &KeyFilter, record: &ConfigRecord) -> Result<(), ServiceError> {
            self.record(StoreCall::Update(filter.key.clone()), Some(&filter.key))?;
            let mut entries = self.entries.lock().unwrap();
            match entries.get_mut(&filter.key) {
                Some(slot) => {
                    *slot = record.clone();
                    Ok(())
                }
                None => Err(ServiceError::not_found(&format!("entry {filter}"))),
            }
        }

        async fn count_all(&self) -> Result<u64, ServiceError> {
            self.record(StoreCall::CountAll, None)?;
            Ok(self.entries.lock().unwrap().len() as u64)
        }

        async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<ConfigRecord>, ServiceError> {
            self.record(StoreCall::ListPage { offset, limit }, None)?;
            let entries = self.entries.lock().unwrap();
            Ok(entries.values().skip(offset as usize).take(limit as usize).cloned().collect())
        }
    }
}
