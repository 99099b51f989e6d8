use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Connect using the pool settings from `[database]`.
pub async fn connect_with_config(cfg: &configs::DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opts).await?;
    tracing::debug!(max_connections = cfg.max_connections, "database pool ready");
    Ok(db)
}
