use sea_orm::{entity::prelude::*, Set, DatabaseConnection, ActiveModelTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

/// One configuration entry. `value` holds the full record payload, `key` included.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "core_store")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_key(key: &str) -> Result<(), errors::ModelError> {
    if key.is_empty() {
        return Err(errors::ModelError::Validation("key required".into()));
    }
    if key.len() > 255 {
        return Err(errors::ModelError::Validation("key longer than 255 bytes".into()));
    }
    Ok(())
}

pub async fn count_by_key(db: &DatabaseConnection, key: &str) -> Result<u64, errors::ModelError> {
    Entity::find()
        .filter(Column::Key.eq(key))
        .count(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_key(db: &DatabaseConnection, key: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(key.to_string())
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn create(db: &DatabaseConnection, key: &str, value: Json) -> Result<Model, errors::ModelError> {
    validate_key(key)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        key: Set(key.to_string()),
        value: Set(value),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Overwrite the payload of an existing entry.
pub async fn update_by_key(db: &DatabaseConnection, key: &str, value: Json) -> Result<Model, errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(key.to_string())
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::NotFound(format!("core_store entry {key:?}")))?
        .into();
    found.value = Set(value);
    found.updated_at = Set(Utc::now().into());
    found.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn count_all(db: &DatabaseConnection) -> Result<u64, errors::ModelError> {
    Entity::find()
        .count(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Entries ordered by key, `limit` rows starting at `offset`.
pub async fn list_page(db: &DatabaseConnection, offset: u64, limit: u64) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::Key)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn delete_by_key(db: &DatabaseConnection, key: &str) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(key.to_string())
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
