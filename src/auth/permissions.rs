/*!
 * # Permissions Module
 *
 * Permission strings are `resource:action`. Routes are gated on these
 * strings; roles map to sets of them in [`crate::auth::rbac`].
 */

/// Permission actions
pub struct Actions;

impl Actions {
    pub const READ: &'static str = "read";
    pub const CREATE: &'static str = "create";
    pub const UPDATE: &'static str = "update";
    pub const VERIFY: &'static str = "verify";
    pub const DELETE: &'static str = "delete";
    pub const MANAGE: &'static str = "manage";
    pub const SEND: &'static str = "send";
}

/// Resource types
pub struct Resources;

impl Resources {
    pub const ITEMS: &'static str = "items";
    pub const MATERIALS: &'static str = "materials";
    pub const USERS: &'static str = "users";
    pub const NOTIFICATIONS: &'static str = "notifications";
    pub const REPORTS: &'static str = "reports";
}

/// Builds a `resource:action` permission string
pub fn permission(resource: &str, action: &str) -> String {
    format!("{}:{}", resource, action)
}

/// Common permission string constants for compile-time safety
pub mod consts {
    // Items
    pub const ITEMS_READ: &str = "items:read";
    pub const ITEMS_CREATE: &str = "items:create";
    pub const ITEMS_UPDATE: &str = "items:update";
    pub const ITEMS_VERIFY: &str = "items:verify";
    pub const ITEMS_DELETE: &str = "items:delete";

    // Materials
    pub const MATERIALS_READ: &str = "materials:read";
    pub const MATERIALS_CREATE: &str = "materials:create";

    // Users
    pub const USERS_MANAGE: &str = "users:manage";

    // Notifications
    pub const NOTIFICATIONS_READ: &str = "notifications:read";
    pub const NOTIFICATIONS_SEND: &str = "notifications:send";

    // Reports
    pub const REPORTS_READ: &str = "reports:read";
}
