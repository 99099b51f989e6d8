use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::debug;

use crate::errors::ServiceError;
use crate::record::{ConfigRecord, KeyFilter};
use crate::store::CoreStore;

/// SeaORM-backed core store over the `core_store` table.
pub struct SeaOrmCoreStore {
    pub db: DatabaseConnection,
}

impl SeaOrmCoreStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    fn to_record(row: models::core_store::Model) -> Result<ConfigRecord, ServiceError> {
        let key = row.key;
        ConfigRecord::try_from(row.value)
            .map_err(|e| ServiceError::Validation(format!("stored entry {key:?} is malformed: {e}")))
    }
}

#[async_trait]
impl CoreStore for SeaOrmCoreStore {
    fn collection(&self) -> &str { "core_store" }

    async fn count(&self, filter: &KeyFilter) -> Result<u64, ServiceError> {
        Ok(models::core_store::count_by_key(&self.db, &filter.key).await?)
    }

    async fn find(&self, filter: &KeyFilter) -> Result<Option<ConfigRecord>, ServiceError> {
        match models::core_store::find_by_key(&self.db, &filter.key).await? {
            Some(row) => Ok(Some(Self::to_record(row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, record: &ConfigRecord) -> Result<(), ServiceError> {
        models::core_store::create(&self.db, record.key(), record.clone().into_value()).await?;
        debug!(key = record.key(), "core_store_row_inserted");
        Ok(())
    }

    async fn update(&self, filter: &KeyFilter, record: &ConfigRecord) -> Result<(), ServiceError> {
        models::core_store::update_by_key(&self.db, &filter.key, record.clone().into_value()).await?;
        debug!(key = %filter.key, "core_store_row_updated");
        Ok(())
    }

    async fn count_all(&self) -> Result<u64, ServiceError> {
        Ok(models::core_store::count_all(&self.db).await?)
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<ConfigRecord>, ServiceError> {
        models::core_store::list_page(&self.db, offset, limit)
            .await?
            .into_iter()
            .map(Self::to_record)
            .collect()
    }
}
