use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::{notification, notification_read},
    errors::{RuleViolation, ServiceError},
    events::{Event, EventSender},
    models::TargetRole,
};
use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    /// Defaults to everyone
    #[serde(default)]
    pub target_role: Option<TargetRole>,
}

/// A notification as seen by one reader
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NotificationView {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub target_role: TargetRole,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl NotificationView {
    fn new(model: &notification::Model, read: bool) -> Self {
        Self {
            id: model.id,
            title: model.title.clone(),
            message: model.message.clone(),
            target_role: model.target_role,
            created_by: model.created_by,
            created_by_name: model.created_by_name.clone(),
            created_at: model.created_at,
            read,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationFeed {
    pub items: Vec<NotificationView>,
    pub unread_count: usize,
}

fn audience(user: &AuthUser) -> [TargetRole; 2] {
    [TargetRole::All, TargetRole::from(user.role)]
}

/// Broadcast notices addressed to everyone or to one role
#[derive(Clone)]
pub struct NotificationService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    feed_limit: u64,
}

impl NotificationService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, feed_limit: u64) -> Self {
        Self {
            db_pool,
            event_sender,
            feed_limit,
        }
    }

    async fn visible(&self, user: &AuthUser) -> Result<Vec<notification::Model>, ServiceError> {
        Ok(notification::Entity::find()
            .filter(notification::Column::TargetRole.is_in(audience(user)))
            .order_by_desc(notification::Column::CreatedAt)
            .limit(self.feed_limit)
            .all(&*self.db_pool)
            .await?)
    }

    /// Newest notices addressed to the caller, with read flags.
    #[instrument(skip(self, user), fields(user = %user.user_id))]
    pub async fn feed(&self, user: &AuthUser) -> Result<NotificationFeed, ServiceError> {
        let visible = self.visible(user).await?;
        let read = self
            .read_ids(user.user_id, visible.iter().map(|m| m.id))
            .await?;
        let items: Vec<NotificationView> = visible
            .iter()
            .map(|m| NotificationView::new(m, read.contains(&m.id)))
            .collect();
        let unread_count = items.iter().filter(|n| !n.read).count();
        Ok(NotificationFeed {
            items,
            unread_count,
        })
    }

    #[instrument(skip(self, input, sender), fields(sender = %sender.user_id))]
    pub async fn send(
        &self,
        input: NewNotification,
        sender: &AuthUser,
    ) -> Result<NotificationView, ServiceError> {
        let title = input.title.trim().to_string();
        let message = input.message.trim().to_string();
        if title.is_empty() || message.is_empty() {
            return Err(RuleViolation::NotificationIncomplete.into());
        }
        let target_role = input.target_role.unwrap_or(TargetRole::All);

        let model = notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            message: Set(message),
            target_role: Set(target_role),
            created_by: Set(sender.user_id),
            created_by_name: Set(sender.name.clone()),
            created_at: Set(Utc::now().trunc_subsecs(6)),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(notification_id = %model.id, ?target_role, "Notification sent");
        self.event_sender
            .send_or_log(Event::NotificationSent {
                notification_id: model.id,
                target_role,
            })
            .await;
        Ok(NotificationView::new(&model, false))
    }

    /// Marks one notice as read. Repeating the call changes nothing.
    #[instrument(skip(self, user), fields(user = %user.user_id))]
    pub async fn mark_read(&self, id: Uuid, user: &AuthUser) -> Result<(), ServiceError> {
        let model = notification::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .filter(|m| m.target_role.includes(user.role))
            .ok_or_else(|| ServiceError::not_found("Notification", id))?;
        self.add_reader(model.id, user.user_id).await?;
        Ok(())
    }

    /// Marks every notice in the caller's feed as read; returns how many changed.
    #[instrument(skip(self, user), fields(user = %user.user_id))]
    pub async fn mark_all_read(&self, user: &AuthUser) -> Result<usize, ServiceError> {
        let mut changed = 0;
        for model in self.visible(user).await? {
            if self.add_reader(model.id, user.user_id).await? {
                changed += 1;
            }
        }
        debug!(changed, "Notifications marked read");
        Ok(changed)
    }

    /// Ids among `ids` that `reader` has already read.
    async fn read_ids(
        &self,
        reader: Uuid,
        ids: impl Iterator<Item = Uuid>,
    ) -> Result<HashSet<Uuid>, ServiceError> {
        let ids: Vec<Uuid> = ids.collect();
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        Ok(notification_read::Entity::find()
            .filter(notification_read::Column::UserId.eq(reader))
            .filter(notification_read::Column::NotificationId.is_in(ids))
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|r| r.notification_id)
            .collect())
    }

    /// Records one read. Returns false when it was already recorded.
    async fn add_reader(&self, notification_id: Uuid, reader: Uuid) -> Result<bool, ServiceError> {
        let read = notification_read::ActiveModel {
            notification_id: Set(notification_id),
            user_id: Set(reader),
            read_at: Set(Utc::now().trunc_subsecs(6)),
        };
        let inserted = notification_read::Entity::insert(read)
            .on_conflict(
                OnConflict::columns([
                    notification_read::Column::NotificationId,
                    notification_read::Column::UserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&*self.db_pool)
            .await?;
        Ok(inserted > 0)
    }
}
