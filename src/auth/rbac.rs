/*!
 * # Role-Based Access Control (RBAC) Module
 *
 * Maps the three warehouse roles to their permission sets. Verifiers hold
 * everything staff hold plus verification and reports; the warehouse admin
 * holds every permission.
 */

use lazy_static::lazy_static;
use std::collections::HashMap;

use super::permissions::consts;
use crate::models::UserRole;

/// Role definition with associated permissions
#[derive(Debug, Clone)]
pub struct Role {
    pub name: &'static str,
    pub description: &'static str,
    pub permissions: Vec<&'static str>,
}

const STAFF_PERMISSIONS: [&str; 6] = [
    consts::ITEMS_READ,
    consts::ITEMS_CREATE,
    consts::ITEMS_UPDATE,
    consts::MATERIALS_READ,
    consts::MATERIALS_CREATE,
    consts::NOTIFICATIONS_READ,
];

lazy_static! {
    pub static ref ROLES: HashMap<UserRole, Role> = {
        let mut roles = HashMap::new();

        roles.insert(
            UserRole::Staff,
            Role {
                name: "staff",
                description: "Submits inventory items and tracks their own entries",
                permissions: STAFF_PERMISSIONS.to_vec(),
            },
        );

        let mut verifier = STAFF_PERMISSIONS.to_vec();
        verifier.extend([consts::ITEMS_VERIFY, consts::REPORTS_READ]);
        roles.insert(
            UserRole::Verifikator,
            Role {
                name: "verifikator",
                description: "Approves or rejects pending submissions",
                permissions: verifier,
            },
        );

        let mut admin = STAFF_PERMISSIONS.to_vec();
        admin.extend([
            consts::ITEMS_VERIFY,
            consts::ITEMS_DELETE,
            consts::REPORTS_READ,
            consts::USERS_MANAGE,
            consts::NOTIFICATIONS_SEND,
        ]);
        roles.insert(
            UserRole::AdminGudang,
            Role {
                name: "admin_gudang",
                description: "Warehouse administrator with full access",
                permissions: admin,
            },
        );

        roles
    };
}

/// Permission strings granted to `role`.
pub fn permissions_for(role: UserRole) -> Vec<String> {
    ROLES
        .get(&role)
        .map(|r| r.permissions.iter().map(|p| p.to_string()).collect())
        .unwrap_or_default()
}

pub fn role_has_permission(role: UserRole, permission: &str) -> bool {
    ROLES
        .get(&role)
        .is_some_and(|r| r.permissions.contains(&permission))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(UserRole::Staff, consts::ITEMS_CREATE, true)]
    #[case(UserRole::Staff, consts::ITEMS_VERIFY, false)]
    #[case(UserRole::Staff, consts::REPORTS_READ, false)]
    #[case(UserRole::Verifikator, consts::ITEMS_VERIFY, true)]
    #[case(UserRole::Verifikator, consts::ITEMS_DELETE, false)]
    #[case(UserRole::Verifikator, consts::USERS_MANAGE, false)]
    #[case(UserRole::AdminGudang, consts::ITEMS_DELETE, true)]
    #[case(UserRole::AdminGudang, consts::NOTIFICATIONS_SEND, true)]
    fn role_permission_table(#[case] role: UserRole, #[case] perm: &str, #[case] granted: bool) {
        assert_eq!(role_has_permission(role, perm), granted);
    }

    #[test]
    fn every_role_is_defined() {
        for role in [UserRole::Staff, UserRole::Verifikator, UserRole::AdminGudang] {
            let def = ROLES.get(&role).unwrap();
            assert_eq!(def.name, role.as_str());
            assert!(!permissions_for(role).is_empty());
        }
    }
}
