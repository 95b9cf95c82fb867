// Domain types shared by services, handlers and entities
pub mod item;
pub mod material;
pub mod notification;
pub mod user;

pub use item::{
    CableDetails, Condition, InventoryItem, ItemDetails, ItemKind, ItemStatus, MaterialDetails,
    MeterDetails, PoleDetails, PoleMaterial, LOCATIONS,
};
pub use material::MaterialCatalogEntry;
pub use notification::TargetRole;
pub use user::UserRole;
