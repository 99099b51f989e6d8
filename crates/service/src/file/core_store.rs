use std::sync::Arc;

use serde_json::Value;

use crate::errors::ServiceError;
use crate::record::{ConfigRecord, KeyFilter};
use crate::storage::json_map_store::JsonMapStore;
use crate::store::CoreStore;

/// File-backed core store.
/// Keeps a map of `key -> record payload` persisted as JSON.
#[derive(Clone)]
pub struct FileCoreStore {
    store: Arc<JsonMapStore<String, Value>>,
    collection: String,
}

impl FileCoreStore {
    /// Open the store at the given file path. Creates the file if missing.
    pub async fn open<P: Into<std::path::PathBuf>>(path: P, collection: &str) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, Value>::new(path).await?;
        Ok(Arc::new(Self { store, collection: collection.to_string() }))
    }

    fn to_record(key: &str, value: Value) -> Result<ConfigRecord, ServiceError> {
        ConfigRecord::try_from(value)
            .map_err(|e| ServiceError::Validation(format!("stored entry {key:?} is malformed: {e}")))
    }
}

#[async_trait::async_trait]
impl CoreStore for FileCoreStore {
    fn collection(&self) -> &str { &self.collection }

    async fn count(&self, filter: &KeyFilter) -> Result<u64, ServiceError> {
        Ok(self.store.contains_key(&filter.key).await as u64)
    }

    async fn find(&self, filter: &KeyFilter) -> Result<Option<ConfigRecord>, ServiceError> {
        match self.store.get(&filter.key).await {
            Some(value) => Ok(Some(Self::to_record(&filter.key, value)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, record: &ConfigRecord) -> Result<(), ServiceError> {
        let key = record.key().to_string();
        let value = record.clone().into_value();
        self.store
            .update_map(|m| {
                if m.contains_key(&key) {
                    return Err(ServiceError::Conflict(format!("key {key:?} already exists")));
                }
                m.insert(key.clone(), value);
                Ok(())
            })
            .await
    }

    async fn update(&self, filter: &KeyFilter, record: &ConfigRecord) -> Result<(), ServiceError> {
        let value = record.clone().into_value();
        self.store
            .update_map(|m| match m.get_mut(&filter.key) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(ServiceError::not_found(&format!("entry {filter}"))),
            })
            .await
    }

    async fn count_all(&self) -> Result<u64, ServiceError> {
        Ok(self.store.len().await as u64)
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<ConfigRecord>, ServiceError> {
        self.store
            .window(offset as usize, limit as usize)
            .await
            .into_iter()
            .map(|(k, v)| Self::to_record(&k, v))
            .collect()
    }
}
