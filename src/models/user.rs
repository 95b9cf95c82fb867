use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Warehouse roles. Permissions per role live in `auth::rbac`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "staff")]
    Staff,
    #[sea_orm(string_value = "verifikator")]
    Verifikator,
    #[sea_orm(string_value = "admin_gudang")]
    AdminGudang,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Staff => "staff",
            UserRole::Verifikator => "verifikator",
            UserRole::AdminGudang => "admin_gudang",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Staff => "Staff",
            UserRole::Verifikator => "Verifikator",
            UserRole::AdminGudang => "Admin Gudang",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Staff
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(UserRole::Staff),
            "verifikator" => Ok(UserRole::Verifikator),
            "admin_gudang" => Ok(UserRole::AdminGudang),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [UserRole::Staff, UserRole::Verifikator, UserRole::AdminGudang] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
            assert_eq!(
                serde_json::to_value(role).unwrap(),
                serde_json::Value::String(role.to_string())
            );
        }
        assert!("manager".parse::<UserRole>().is_err());
    }
}
