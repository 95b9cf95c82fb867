use crate::{
    auth::AuthUser,
    catalog,
    db::DbPool,
    entities::inventory_item::{self, Entity as ItemEntity},
    errors::{RuleViolation, ServiceError},
    events::{ChangeFeed, ChangeKind, Event, EventSender, ItemChange},
    lifecycle::{self, StatusChange, Verifier},
    models::{Condition, InventoryItem, ItemDetails, ItemStatus, MaterialCatalogEntry},
    services::materials::MaterialService,
    views::{self, ItemFilter, ItemView},
};
use chrono::{SubsecRound, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Select, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// A new submission. The kind payload is flattened next to the common fields.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewItem {
    #[serde(flatten)]
    pub details: ItemDetails,
    pub condition: Condition,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Partial edit of an item. Status is never touched by an edit.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ItemPatch {
    /// Pole volume, cable length or piece count depending on the kind
    pub quantity: Option<f64>,
    pub location: Option<String>,
    pub image_urls: Option<Vec<String>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.location.is_none() && self.image_urls.is_none()
    }
}

/// One page of a filtered list.
#[derive(Debug, Clone, Serialize)]
pub struct ItemPage {
    pub items: Vec<InventoryItem>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Checks a submission and fills material fields from the catalog.
///
/// Locations are stored trimmed. When a known catalog code is given, a blank
/// name, unit or category is taken from the catalog entry.
pub fn prepare_details(
    mut details: ItemDetails,
    catalog: &[MaterialCatalogEntry],
) -> Result<ItemDetails, RuleViolation> {
    let location = details.location().trim().to_string();
    if location.is_empty() {
        return Err(RuleViolation::LocationRequired);
    }
    details.set_location(location);

    match &mut details {
        ItemDetails::Tiang(d) if d.volume < 1 => return Err(RuleViolation::QuantityTooSmall),
        ItemDetails::KwhMeter(d) if d.quantity < 1 => {
            return Err(RuleViolation::QuantityTooSmall)
        }
        ItemDetails::Kabel(d) if !(d.length.is_finite() && d.length > 0.0) => {
            return Err(RuleViolation::QuantityTooSmall)
        }
        ItemDetails::MaterialUmum(d) => {
            if d.quantity < 1 {
                return Err(RuleViolation::QuantityTooSmall);
            }
            let known = d
                .catalog_code
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .and_then(|code| catalog::find_by_code(catalog, code));
            if let Some(entry) = known {
                fill_blank(&mut d.unit, &entry.unit);
                fill_blank(&mut d.category, &entry.category);
                if d.name.trim().is_empty() {
                    d.name = entry.name.clone();
                }
            }
            d.name = d.name.trim().to_string();
            if d.name.is_empty() {
                return Err(RuleViolation::MaterialNameRequired);
            }
        }
        _ => {}
    }

    Ok(details)
}

fn fill_blank(field: &mut Option<String>, value: &str) {
    if field.as_deref().map_or(true, |v| v.trim().is_empty()) {
        *field = Some(value.to_string());
    }
}

/// Applies an edit to a copy of `item`, enforcing who may edit what.
pub fn apply_patch(
    item: &InventoryItem,
    patch: &ItemPatch,
    editor: &AuthUser,
) -> Result<InventoryItem, ServiceError> {
    if patch.is_empty() {
        return Err(RuleViolation::EmptyEdit.into());
    }
    if !editor.is_admin() {
        if item.created_by != editor.user_id {
            return Err(ServiceError::Forbidden(format!(
                "item {} belongs to another user",
                item.id
            )));
        }
        if !item.is_pending() {
            return Err(RuleViolation::ItemLocked.into());
        }
    }

    let mut next = item.clone();
    if let Some(quantity) = patch.quantity {
        next.details.set_quantity(quantity)?;
    }
    if let Some(location) = &patch.location {
        let location = location.trim();
        if location.is_empty() {
            return Err(RuleViolation::LocationRequired.into());
        }
        next.details.set_location(location.to_string());
    }
    if let Some(urls) = &patch.image_urls {
        next.image_urls = urls.clone();
    }
    next.updated_at = lifecycle::next_updated_at(item.updated_at, Utc::now());
    Ok(next)
}

/// Item store: persistence for the verification workflow plus publication of
/// every committed write.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    feed: ChangeFeed,
    materials: MaterialService,
}

impl InventoryService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        feed: ChangeFeed,
        materials: MaterialService,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            feed,
            materials,
        }
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Submits an item; it always starts out pending.
    #[instrument(skip(self, creator, input), fields(kind = ?input.details.kind()))]
    pub async fn create(
        &self,
        creator: &AuthUser,
        input: NewItem,
    ) -> Result<InventoryItem, ServiceError> {
        let catalog = self.materials.catalog().await?;
        let details = prepare_details(input.details, &catalog)?;

        let now = Utc::now().trunc_subsecs(6);
        let item = InventoryItem {
            id: Uuid::new_v4(),
            details,
            condition: input.condition,
            status: ItemStatus::Pending,
            created_by: creator.user_id,
            created_by_name: creator.name.clone(),
            verified_by: None,
            verified_by_name: None,
            rejection_note: None,
            image_urls: clean_urls(input.image_urls),
            created_at: now,
            updated_at: now,
        };

        inventory_item::ActiveModel::try_from(&item)?
            .insert(&*self.db_pool)
            .await?;
        info!(item_id = %item.id, "Item submitted");

        self.event_sender
            .send_or_log(Event::ItemSubmitted {
                item_id: item.id,
                kind: item.kind(),
                created_by: item.created_by,
            })
            .await;
        self.feed
            .publish(ItemChange::new(ChangeKind::Created, item.clone()));
        Ok(item)
    }

    /// Loads an item without access checks.
    pub async fn find(&self, id: Uuid) -> Result<InventoryItem, ServiceError> {
        ItemEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Item", id))?
            .try_into()
    }

    /// Loads an item as seen by `viewer`. Staff may only read their own.
    #[instrument(skip(self, viewer), fields(viewer = %viewer.user_id))]
    pub async fn get(&self, id: Uuid, viewer: &AuthUser) -> Result<InventoryItem, ServiceError> {
        let item = self.find(id).await?;
        if viewer.role == crate::models::UserRole::Staff && item.created_by != viewer.user_id {
            return Err(ServiceError::Forbidden(format!(
                "item {} belongs to another user",
                id
            )));
        }
        Ok(item)
    }

    /// Lists a view, newest first, after the secondary filters.
    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        view: ItemView,
        filter: &ItemFilter,
        page: u64,
        limit: u64,
    ) -> Result<ItemPage, ServiceError> {
        let now = Utc::now();
        let query = scoped_query(view, filter, now);
        let rows = query.all(&*self.db_pool).await?;
        let loaded = to_items(rows);

        let matching = views::apply(&loaded, &view, filter, now);
        let total = matching.len() as u64;
        let page = page.max(1);
        let limit = limit.max(1);
        let items = page_slice(matching, page, limit);

        Ok(ItemPage {
            items,
            total,
            page,
            limit,
        })
    }

    /// Every item, newest first. Used by reports.
    pub async fn all_items(&self) -> Result<Vec<InventoryItem>, ServiceError> {
        let rows = ItemEntity::find()
            .order_by_desc(inventory_item::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(to_items(rows))
    }

    /// Edits quantity, location or images.
    #[instrument(skip(self, editor, patch), fields(editor = %editor.user_id))]
    pub async fn update(
        &self,
        id: Uuid,
        editor: &AuthUser,
        patch: ItemPatch,
    ) -> Result<InventoryItem, ServiceError> {
        let current = self.find(id).await?;
        let next = apply_patch(&current, &patch, editor)?;

        let changes = inventory_item::ActiveModel {
            details: Set(serde_json::to_value(&next.details)?),
            image_urls: Set(serde_json::to_value(&next.image_urls)?),
            updated_at: Set(next.updated_at),
            ..Default::default()
        };
        let mut write = ItemEntity::update_many()
            .set(changes)
            .filter(inventory_item::Column::Id.eq(id));
        if !editor.is_admin() {
            // A verifier may have decided the item since it was loaded
            write = write.filter(inventory_item::Column::Status.eq(ItemStatus::Pending));
        }
        let result = write.exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(RuleViolation::ItemLocked.into());
        }

        let updated = self.find(id).await?;
        self.event_sender
            .send_or_log(Event::ItemUpdated {
                item_id: id,
                updated_by: editor.user_id,
            })
            .await;
        self.feed
            .publish(ItemChange::new(ChangeKind::Updated, updated.clone()));
        Ok(updated)
    }

    /// Approves or rejects a pending item.
    ///
    /// The write only succeeds while the row is still pending, so of two
    /// concurrent verifiers the first wins and the second gets a conflict.
    #[instrument(skip(self, verifier), fields(verifier = %verifier.user_id))]
    pub async fn update_status(
        &self,
        id: Uuid,
        change: StatusChange,
        verifier: &AuthUser,
    ) -> Result<InventoryItem, ServiceError> {
        let current = self.find(id).await?;
        self.apply_status_change(&current, change, verifier).await
    }

    /// Writes a status change computed from `current`.
    ///
    /// The row must still be pending and carry the `updated_at` that was read,
    /// otherwise nothing is written and the caller gets a conflict.
    pub async fn apply_status_change(
        &self,
        current: &InventoryItem,
        change: StatusChange,
        verifier: &AuthUser,
    ) -> Result<InventoryItem, ServiceError> {
        let id = current.id;
        let next = lifecycle::apply_transition(
            current,
            &change,
            Verifier {
                id: verifier.user_id,
                name: &verifier.name,
            },
            Utc::now(),
        )?;

        let changes = inventory_item::ActiveModel {
            status: Set(next.status),
            verified_by: Set(next.verified_by),
            verified_by_name: Set(next.verified_by_name.clone()),
            rejection_note: Set(next.rejection_note.clone()),
            updated_at: Set(next.updated_at),
            ..Default::default()
        };
        let result = ItemEntity::update_many()
            .set(changes)
            .filter(inventory_item::Column::Id.eq(id))
            .filter(inventory_item::Column::Status.eq(ItemStatus::Pending))
            .filter(inventory_item::Column::UpdatedAt.eq(current.updated_at))
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            warn!(item_id = %id, "Item changed while being verified");
            return Err(RuleViolation::ConcurrentVerification.into());
        }

        info!(item_id = %id, status = ?next.status, "Item verified");
        self.event_sender
            .send_or_log(Event::ItemStatusChanged {
                item_id: id,
                status: next.status,
                verified_by: verifier.user_id,
            })
            .await;
        self.feed
            .publish(ItemChange::new(ChangeKind::StatusChanged, next.clone()));
        Ok(next)
    }

    /// Removes an item permanently.
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn delete(&self, id: Uuid, actor: &AuthUser) -> Result<(), ServiceError> {
        let item = self.find(id).await?;
        let result = ItemEntity::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Item", id));
        }

        info!(item_id = %id, "Item deleted");
        self.event_sender
            .send_or_log(Event::ItemDeleted {
                item_id: id,
                deleted_by: actor.user_id,
            })
            .await;
        self.feed.publish(ItemChange::new(ChangeKind::Deleted, item));
        Ok(())
    }
}

/// Pushes the view and the column filters into SQL. Search and category live
/// inside the JSON payload and are left to the in-memory pass.
fn scoped_query(
    view: ItemView,
    filter: &ItemFilter,
    now: chrono::DateTime<Utc>,
) -> Select<ItemEntity> {
    let mut query = ItemEntity::find().order_by_desc(inventory_item::Column::CreatedAt);

    query = match view {
        ItemView::Mine(user_id) => query.filter(inventory_item::Column::CreatedBy.eq(user_id)),
        ItemView::Pending => {
            query.filter(inventory_item::Column::Status.eq(ItemStatus::Pending))
        }
        ItemView::All => query,
    };
    if !filter.statuses.is_empty() {
        query = query.filter(inventory_item::Column::Status.is_in(filter.statuses.clone()));
    }
    if let Some(kind) = filter.kind {
        query = query.filter(inventory_item::Column::Kind.eq(kind));
    }
    if let Some(condition) = filter.condition {
        query = query.filter(inventory_item::Column::Condition.eq(condition));
    }
    if let Some(start) = filter.range.start(now) {
        query = query.filter(inventory_item::Column::CreatedAt.gte(start));
    }
    query
}

/// Converts rows, skipping (and logging) any that no longer decode.
fn to_items(rows: Vec<inventory_item::Model>) -> Vec<InventoryItem> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            InventoryItem::try_from(row)
                .map_err(|e| warn!(item_id = %id, error = %e, "Skipping undecodable item"))
                .ok()
        })
        .collect()
}

/// Cuts one page out of `items`. Pages are 1-based; a page past the end is
/// empty, however large the number.
pub fn page_slice<T>(items: Vec<T>, page: u64, limit: u64) -> Vec<T> {
    let offset = page.saturating_sub(1).saturating_mul(limit);
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

fn clean_urls(urls: Vec<String>) -> Vec<String> {
    urls.into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::fixtures;
    use crate::models::{CableDetails, MaterialDetails, PoleDetails, PoleMaterial, UserRole};
    use assert_matches::assert_matches;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            name: "Andi".into(),
            email: "andi@pln.co.id".into(),
            role,
            permissions: crate::auth::permissions_for(role),
            token_id: "t".into(),
        }
    }

    fn pole(volume: i64, location: &str) -> ItemDetails {
        ItemDetails::Tiang(PoleDetails {
            volume,
            pole_id: "T-01".into(),
            height: 9.0,
            material: PoleMaterial::Beton,
            location: location.into(),
        })
    }

    #[test]
    fn submissions_need_location_and_positive_amounts() {
        assert_matches!(
            prepare_details(pole(1, "   "), &[]),
            Err(RuleViolation::LocationRequired)
        );
        assert_matches!(
            prepare_details(pole(0, "Rak 1"), &[]),
            Err(RuleViolation::QuantityTooSmall)
        );
        let cable = ItemDetails::Kabel(CableDetails {
            description: "NYY".into(),
            length: 0.0,
            location: "Rak 2".into(),
        });
        assert_matches!(
            prepare_details(cable, &[]),
            Err(RuleViolation::QuantityTooSmall)
        );

        let ok = prepare_details(pole(2, "  Rak 4 "), &[]).unwrap();
        assert_eq!(ok.location(), "Rak 4");
    }

    #[test]
    fn catalog_code_fills_blank_material_fields() {
        let catalog = vec![MaterialCatalogEntry::new("3130028", "MCB 1P 6A", "BH", "MCB")];
        let details = ItemDetails::MaterialUmum(MaterialDetails {
            name: "".into(),
            catalog_code: Some("3130028".into()),
            unit: None,
            category: Some(" ".into()),
            serial_number: None,
            quantity: 3,
            location: "Rak 5".into(),
            notes: None,
        });

        let prepared = prepare_details(details, &catalog).unwrap();
        match prepared {
            ItemDetails::MaterialUmum(d) => {
                assert_eq!(d.name, "MCB 1P 6A");
                assert_eq!(d.unit.as_deref(), Some("BH"));
                assert_eq!(d.category.as_deref(), Some("MCB"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let unnamed = fixtures::material("  ", None, 1);
        assert_matches!(
            prepare_details(unnamed, &catalog),
            Err(RuleViolation::MaterialNameRequired)
        );
    }

    #[test]
    fn staff_edits_only_their_own_pending_items() {
        let staff = user(UserRole::Staff);
        let own = fixtures::item(staff.user_id, ItemStatus::Pending, fixtures::material("Fuse", None, 4));
        let patch = ItemPatch {
            quantity: Some(7.0),
            ..Default::default()
        };

        let edited = apply_patch(&own, &patch, &staff).unwrap();
        assert_eq!(edited.details.quantity(), 7.0);
        assert_eq!(edited.status, ItemStatus::Pending);
        assert!(edited.updated_at > own.updated_at);

        let mut approved = own.clone();
        approved.status = ItemStatus::Approved;
        assert_matches!(
            apply_patch(&approved, &patch, &staff),
            Err(ServiceError::Rule(RuleViolation::ItemLocked))
        );

        let foreign = fixtures::item(Uuid::new_v4(), ItemStatus::Pending, fixtures::material("Fuse", None, 4));
        assert_matches!(
            apply_patch(&foreign, &patch, &staff),
            Err(ServiceError::Forbidden(_))
        );

        let admin = user(UserRole::AdminGudang);
        let edited = apply_patch(&approved, &patch, &admin).unwrap();
        assert_eq!(edited.status, ItemStatus::Approved);
    }

    #[test]
    fn pages_past_the_end_are_empty() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(page_slice(items.clone(), 1, 3), vec![1, 2, 3]);
        assert_eq!(page_slice(items.clone(), 3, 3), vec![7]);
        assert!(page_slice(items.clone(), 4, 3).is_empty());
        assert!(page_slice(items.clone(), u64::MAX, 100).is_empty());
        assert!(page_slice(items.clone(), u64::MAX, u64::MAX).is_empty());
        assert_eq!(page_slice(items, 1, u64::MAX).len(), 7);
    }

    #[test]
    fn empty_or_invalid_edits_are_refused() {
        let staff = user(UserRole::Staff);
        let own = fixtures::item(staff.user_id, ItemStatus::Pending, fixtures::material("Fuse", None, 4));

        assert_matches!(
            apply_patch(&own, &ItemPatch::default(), &staff),
            Err(ServiceError::Rule(RuleViolation::EmptyEdit))
        );
        let blank_location = ItemPatch {
            location: Some(" ".into()),
            ..Default::default()
        };
        assert_matches!(
            apply_patch(&own, &blank_location, &staff),
            Err(ServiceError::Rule(RuleViolation::LocationRequired))
        );
        let negative = ItemPatch {
            quantity: Some(-1.0),
            ..Default::default()
        };
        assert_matches!(
            apply_patch(&own, &negative, &staff),
            Err(ServiceError::Rule(RuleViolation::NegativeQuantity))
        );
    }
}
