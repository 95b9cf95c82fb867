// Item workflow
pub mod inventory;

// Catalog and accounts
pub mod materials;
pub mod users;

// Broadcasts and reporting
pub mod notifications;
pub mod reports;
