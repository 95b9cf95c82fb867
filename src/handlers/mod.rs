pub mod common;
pub mod items;
pub mod materials;
pub mod notifications;
pub mod reports;
pub mod users;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::{ChangeFeed, EventSender},
    services::{
        inventory::InventoryService, materials::MaterialService,
        notifications::NotificationService, reports::ReportService, users::UserService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<InventoryService>,
    pub materials: Arc<MaterialService>,
    pub users: Arc<UserService>,
    pub notifications: Arc<NotificationService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    /// Wires every service against one connection pool, one event channel and
    /// one change feed.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        feed: ChangeFeed,
        config: &AppConfig,
    ) -> Self {
        let materials = MaterialService::new(db_pool.clone(), event_sender.clone());
        let users = UserService::new(db_pool.clone(), event_sender.clone());
        let inventory = InventoryService::new(
            db_pool.clone(),
            event_sender.clone(),
            feed,
            materials.clone(),
        );
        let notifications = NotificationService::new(
            db_pool,
            event_sender,
            config.notification_feed_limit,
        );
        let reports = ReportService::new(
            inventory.clone(),
            users.clone(),
            config.low_stock_threshold,
        );

        Self {
            inventory: Arc::new(inventory),
            materials: Arc::new(materials),
            users: Arc::new(users),
            notifications: Arc::new(notifications),
            reports: Arc::new(reports),
        }
    }
}
