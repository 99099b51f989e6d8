//! Create `core_store` table.
//! One row per configuration key; the whole record is kept as JSON in `value`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CoreStore::Table)
                    .if_not_exists()
                    .col(string_len(CoreStore::Key, 255).primary_key())
                    .col(json(CoreStore::Value).not_null())
                    .col(timestamp_with_time_zone(CoreStore::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(CoreStore::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CoreStore::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CoreStore {
    Table,
    Key,
    Value,
    CreatedAt,
    UpdatedAt,
}
