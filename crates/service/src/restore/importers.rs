//! One importer per strategy. Each call re-reads the store; nothing is cached
//! between records.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::errors::RestoreError;
use super::merge::deep_merge;
use super::strategy::{ImportOutcome, Importer, Strategy};
use crate::record::ConfigRecord;
use crate::store::CoreStore;

/// Full overwrite of existing entries.
pub struct ReplaceImporter {
    store: Arc<dyn CoreStore>,
}

impl ReplaceImporter {
    pub fn new(store: Arc<dyn CoreStore>) -> Self { Self { store } }
}

#[async_trait]
impl Importer for ReplaceImporter {
    fn strategy(&self) -> Strategy { Strategy::Replace }

    #[instrument(skip_all, fields(key = record.key()))]
    async fn import(&self, record: &ConfigRecord) -> Result<ImportOutcome, RestoreError> {
        let filter = record.filter();
        if self.store.count(&filter).await? > 0 {
            self.store.update(&filter, record).await?;
            debug!(event = "record_replaced", "existing entry overwritten");
            Ok(ImportOutcome::Updated)
        } else {
            self.store.create(record).await?;
            debug!(event = "record_created", "new entry created");
            Ok(ImportOutcome::Created)
        }
    }
}

/// Deep merge into existing entries.
pub struct MergeImporter {
    store: Arc<dyn CoreStore>,
}

impl MergeImporter {
    pub fn new(store: Arc<dyn CoreStore>) -> Self { Self { store } }
}

#[async_trait]
impl Importer for MergeImporter {
    fn strategy(&self) -> Strategy { Strategy::Merge }

    #[instrument(skip_all, fields(key = record.key()))]
    async fn import(&self, record: &ConfigRecord) -> Result<ImportOutcome, RestoreError> {
        let filter = record.filter();
        match self.store.find(&filter).await? {
            Some(existing) => {
                let merged = deep_merge(existing.fields(), record.fields());
                // incoming `key` equals the filter key, so the merged map keeps a string key
                let merged = ConfigRecord::from_map(merged).map_err(|e| {
                    RestoreError::InvalidInput(format!("merged entry {:?}: {e}", filter.key))
                })?;
                self.store.update(&filter, &merged).await?;
                debug!(event = "record_merged", "incoming fields merged into existing entry");
                Ok(ImportOutcome::Updated)
            }
            None => {
                self.store.create(record).await?;
                debug!(event = "record_created", "new entry created");
                Ok(ImportOutcome::Created)
            }
        }
    }
}

/// Only fills gaps; existing entries are never touched.
pub struct KeepImporter {
    store: Arc<dyn CoreStore>,
}

impl KeepImporter {
    pub fn new(store: Arc<dyn CoreStore>) -> Self { Self { store } }
}

#[async_trait]
impl Importer for KeepImporter {
    fn strategy(&self) -> Strategy { Strategy::Keep }

    #[instrument(skip_all, fields(key = record.key()))]
    async fn import(&self, record: &ConfigRecord) -> Result<ImportOutcome, RestoreError> {
        let filter = record.filter();
        if self.store.count(&filter).await? > 0 {
            debug!(event = "record_kept", "entry exists; incoming record discarded");
            return Ok(ImportOutcome::Unchanged);
        }
        self.store.create(record).await?;
        debug!(event = "record_created", "new entry created");
        Ok(ImportOutcome::Created)
    }
}
