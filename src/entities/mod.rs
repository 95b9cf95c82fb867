pub mod inventory_item;
pub mod material;
pub mod notification;
pub mod notification_read;
