use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::models::{Condition, InventoryItem, ItemDetails, ItemKind, ItemStatus};

/// The `inventory_items` table. The kind payload is kept as JSON next to a
/// plain `kind` column used for filtering.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: ItemKind,
    pub condition: Condition,
    pub status: ItemStatus,
    #[sea_orm(column_type = "Json")]
    pub details: Json,
    #[sea_orm(column_type = "Json")]
    pub image_urls: Json,
    pub created_by: Uuid,
    pub created_by_name: String,
    #[sea_orm(nullable)]
    pub verified_by: Option<Uuid>,
    #[sea_orm(nullable)]
    pub verified_by_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for InventoryItem {
    type Error = ServiceError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let details: ItemDetails = serde_json::from_value(model.details)?;
        if details.kind() != model.kind {
            return Err(ServiceError::InternalError(format!(
                "item {} stores {:?} details under kind {:?}",
                model.id,
                details.kind(),
                model.kind
            )));
        }
        let image_urls: Vec<String> = serde_json::from_value(model.image_urls)?;

        Ok(InventoryItem {
            id: model.id,
            details,
            condition: model.condition,
            status: model.status,
            created_by: model.created_by,
            created_by_name: model.created_by_name,
            verified_by: model.verified_by,
            verified_by_name: model.verified_by_name,
            rejection_note: model.rejection_note,
            image_urls,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<&InventoryItem> for ActiveModel {
    type Error = ServiceError;

    fn try_from(item: &InventoryItem) -> Result<Self, Self::Error> {
        Ok(ActiveModel {
            id: Set(item.id),
            kind: Set(item.kind()),
            condition: Set(item.condition),
            status: Set(item.status),
            details: Set(serde_json::to_value(&item.details)?),
            image_urls: Set(serde_json::to_value(&item.image_urls)?),
            created_by: Set(item.created_by),
            created_by_name: Set(item.created_by_name.clone()),
            verified_by: Set(item.verified_by),
            verified_by_name: Set(item.verified_by_name.clone()),
            rejection_note: Set(item.rejection_note.clone()),
            created_at: Set(item.created_at),
            updated_at: Set(item.updated_at),
        })
    }
}
