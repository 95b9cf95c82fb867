use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{InventoryItem, UserRole};
use crate::views::ItemView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    StatusChanged,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::StatusChanged => "status_changed",
            ChangeKind::Deleted => "deleted",
        }
    }
}

/// A committed change to an item. `item` is the state after the change, or
/// the last known state for deletions.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemChange {
    pub change: ChangeKind,
    pub item: InventoryItem,
    pub at: DateTime<Utc>,
}

impl ItemChange {
    pub fn new(change: ChangeKind, item: InventoryItem) -> Self {
        Self {
            change,
            item,
            at: Utc::now(),
        }
    }

    /// Whether a subscriber on `view` should receive this change.
    ///
    /// Pending subscribers also get status changes so they can drop items
    /// that left the queue. Deletions always reach admins and the creator.
    pub fn visible_in(&self, view: &ItemView, viewer_id: Uuid, viewer_role: UserRole) -> bool {
        match self.change {
            ChangeKind::Created | ChangeKind::Updated => view.matches(&self.item),
            ChangeKind::StatusChanged => {
                *view == ItemView::Pending || view.matches(&self.item)
            }
            ChangeKind::Deleted => {
                viewer_role == UserRole::AdminGudang
                    || self.item.created_by == viewer_id
                    || view.matches(&self.item)
            }
        }
    }
}

/// Live broadcast of item changes to SSE subscribers.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ItemChange>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a change; returns the number of subscribers reached.
    pub fn publish(&self, change: ItemChange) -> usize {
        // No subscribers is the normal idle state
        self.sender.send(change).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ItemChange> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
