use crate::{
    auth::AuthUser,
    catalog::{self, DEFAULT_CATEGORY, DEFAULT_UNIT},
    db::DbPool,
    entities::material,
    errors::{RuleViolation, ServiceError},
    events::{Event, EventSender},
    models::MaterialCatalogEntry,
};
use chrono::Utc;
use sea_orm::{sea_query::OnConflict, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

/// Catalog entry submitted by a user. Unit and category fall back to the
/// catalog defaults when left blank.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewMaterial {
    #[schema(example = "000000003130028")]
    pub code: String,
    #[schema(example = "MCB 1P 6A")]
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewMaterial {
    /// Normalizes the submission into a catalog entry.
    pub fn into_entry(self) -> Result<MaterialCatalogEntry, RuleViolation> {
        let code = self.code.trim().to_string();
        if code.is_empty() {
            return Err(RuleViolation::MaterialCodeRequired);
        }
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(RuleViolation::MaterialNameRequired);
        }
        let or_default = |value: Option<String>, default: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(MaterialCatalogEntry {
            code,
            name,
            unit: or_default(self.unit, DEFAULT_UNIT),
            category: or_default(self.category, DEFAULT_CATEGORY),
        })
    }
}

/// Material catalog backed by the bundled list and the `materials` table
#[derive(Clone)]
pub struct MaterialService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl MaterialService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Entries added at runtime, oldest first so later writes win a merge.
    pub async fn live_entries(&self) -> Result<Vec<MaterialCatalogEntry>, ServiceError> {
        let rows = material::Entity::find()
            .order_by_asc(material::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(rows.into_iter().map(MaterialCatalogEntry::from).collect())
    }

    /// The merged catalog.
    pub async fn catalog(&self) -> Result<Vec<MaterialCatalogEntry>, ServiceError> {
        let live = self.live_entries().await?;
        Ok(catalog::merge(catalog::static_entries(), &live))
    }

    /// Catalog narrowed by free-text search and exact category.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<MaterialCatalogEntry>, ServiceError> {
        let merged = self.catalog().await?;
        let in_category: Vec<MaterialCatalogEntry> = match category.map(str::trim) {
            Some(c) if !c.is_empty() => catalog::by_category(&merged, c)
                .into_iter()
                .cloned()
                .collect(),
            _ => merged,
        };
        Ok(catalog::search(&in_category, search.unwrap_or(""))
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        Ok(catalog::categories(&self.catalog().await?))
    }

    /// Adds an entry, replacing any runtime entry with the same code.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn add(
        &self,
        input: NewMaterial,
        actor: &AuthUser,
    ) -> Result<MaterialCatalogEntry, ServiceError> {
        let entry = input.into_entry()?;
        entry.validate()?;
        let row = material::ActiveModel {
            code: Set(entry.code.clone()),
            name: Set(entry.name.clone()),
            unit: Set(entry.unit.clone()),
            category: Set(entry.category.clone()),
            created_by: Set(Some(actor.user_id)),
            created_at: Set(Utc::now()),
        };
        // upsert keyed on the code, last writer wins
        material::Entity::insert(row)
            .on_conflict(
                OnConflict::column(material::Column::Code)
                    .update_columns([
                        material::Column::Name,
                        material::Column::Unit,
                        material::Column::Category,
                        material::Column::CreatedBy,
                        material::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&*self.db_pool)
            .await?;
        info!(code = %entry.code, "Material catalog entry saved");

        self.event_sender
            .send_or_log(Event::MaterialAdded {
                code: entry.code.clone(),
                added_by: actor.user_id,
            })
            .await;
        Ok(entry)
    }
}
