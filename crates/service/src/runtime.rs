//! Runtime environment helpers
//!
//! Opens the configured core store backend so binaries only deal with
//! `Arc<dyn CoreStore>`.

use std::path::Path;
use std::sync::Arc;

use migration::MigratorTrait;
use tracing::info;

use crate::db::core_store::SeaOrmCoreStore;
use crate::file::core_store::FileCoreStore;
use crate::store::CoreStore;

/// Open the store selected by `[store].backend`.
pub async fn open_store(cfg: &configs::AppConfig) -> anyhow::Result<Arc<dyn CoreStore>> {
    match cfg.store.backend.as_str() {
        "file" => {
            let path = Path::new(&cfg.store.data_file);
            common::env::ensure_parent_dir(path).await?;
            let store = FileCoreStore::open(path, &cfg.store.collection).await?;
            info!(event = "store_opened", backend = "file", path = %path.display(), "core store ready");
            Ok(store)
        }
        "database" => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            if cfg.database.run_migrations {
                migration::Migrator::up(&db, None).await?;
            }
            info!(event = "store_opened", backend = "database", "core store ready");
            Ok(Arc::new(SeaOrmCoreStore::new(db)))
        }
        other => Err(anyhow::anyhow!("unknown store backend {other:?}")),
    }
}
