use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{ItemKind, ItemStatus, TargetRole};

pub mod feed;

pub use feed::{ChangeFeed, ChangeKind, ItemChange};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the processor is gone.
    /// Domain writes are already committed at this point.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("{}", e);
        }
    }
}

/// Domain events emitted after a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ItemSubmitted {
        item_id: Uuid,
        kind: ItemKind,
        created_by: Uuid,
    },
    ItemUpdated {
        item_id: Uuid,
        updated_by: Uuid,
    },
    ItemStatusChanged {
        item_id: Uuid,
        status: ItemStatus,
        verified_by: Uuid,
    },
    ItemDeleted {
        item_id: Uuid,
        deleted_by: Uuid,
    },
    MaterialAdded {
        code: String,
        added_by: Uuid,
    },
    UserLoggedIn(Uuid),
    UserCreated(Uuid),
    UserUpdated(Uuid),
    UserActivationChanged {
        user_id: Uuid,
        active: bool,
    },
    UserPasswordReset(Uuid),
    NotificationSent {
        notification_id: Uuid,
        target_role: TargetRole,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ItemSubmitted { .. } => "item_submitted",
            Event::ItemUpdated { .. } => "item_updated",
            Event::ItemStatusChanged { .. } => "item_status_changed",
            Event::ItemDeleted { .. } => "item_deleted",
            Event::MaterialAdded { .. } => "material_added",
            Event::UserLoggedIn(_) => "user_logged_in",
            Event::UserCreated(_) => "user_created",
            Event::UserUpdated(_) => "user_updated",
            Event::UserActivationChanged { .. } => "user_activation_changed",
            Event::UserPasswordReset(_) => "user_password_reset",
            Event::NotificationSent { .. } => "notification_sent",
        }
    }
}

// Handlers implementing this trait process events asynchronously.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: &Event) -> Result<(), String>;
}

/// Counts domain events as metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsEventHandler;

#[async_trait]
impl EventHandler for MetricsEventHandler {
    async fn handle_event(&self, event: &Event) -> Result<(), String> {
        match event {
            Event::ItemSubmitted { .. } => counter!("gudang.items.submitted", 1),
            Event::ItemStatusChanged {
                status: ItemStatus::Approved,
                ..
            } => counter!("gudang.items.approved", 1),
            Event::ItemStatusChanged {
                status: ItemStatus::Rejected,
                ..
            } => counter!("gudang.items.rejected", 1),
            Event::ItemDeleted { .. } => counter!("gudang.items.deleted", 1),
            Event::UserLoggedIn(_) => counter!("gudang.auth.logins", 1),
            Event::NotificationSent { .. } => counter!("gudang.notifications.sent", 1),
            _ => counter!("gudang.events.other", 1),
        }
        Ok(())
    }
}

/// Drains the event channel, logging every event and fanning it out to the
/// registered handlers. Returns once all senders are dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, handlers: Vec<Arc<dyn EventHandler>>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        log_event(&event);

        for handler in &handlers {
            if let Err(e) = handler.handle_event(&event).await {
                error!(event = event.name(), error = %e, "Event handler failed");
            }
        }
    }

    warn!("Event processing loop has ended");
}

fn log_event(event: &Event) {
    match event {
        Event::ItemSubmitted {
            item_id,
            kind,
            created_by,
        } => info!(%item_id, ?kind, %created_by, "Item submitted"),
        Event::ItemUpdated {
            item_id,
            updated_by,
        } => info!(%item_id, %updated_by, "Item updated"),
        Event::ItemStatusChanged {
            item_id,
            status,
            verified_by,
        } => info!(%item_id, ?status, %verified_by, "Item verified"),
        Event::ItemDeleted {
            item_id,
            deleted_by,
        } => info!(%item_id, %deleted_by, "Item deleted"),
        Event::MaterialAdded { code, added_by } => {
            info!(%code, %added_by, "Material catalog entry added")
        }
        Event::UserLoggedIn(user_id) => info!(%user_id, "User logged in"),
        Event::UserCreated(user_id) => info!(%user_id, "User created"),
        Event::UserUpdated(user_id) => info!(%user_id, "User updated"),
        Event::UserActivationChanged { user_id, active } => {
            info!(%user_id, active, "User activation changed")
        }
        Event::UserPasswordReset(user_id) => info!(%user_id, "User password reset"),
        Event::NotificationSent {
            notification_id,
            target_role,
        } => info!(%notification_id, ?target_role, "Notification sent"),
    }
}
