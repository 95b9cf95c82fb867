use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserRole;

/// Audience of a broadcast notice.
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
pub enum TargetRole {
    #[sea_orm(string_value = "all")]
    All,
    #[sea_orm(string_value = "staff")]
    Staff,
    #[sea_orm(string_value = "verifikator")]
    Verifikator,
    #[sea_orm(string_value = "admin_gudang")]
    AdminGudang,
}

impl TargetRole {
    pub fn includes(&self, role: UserRole) -> bool {
        match self {
            TargetRole::All => true,
            TargetRole::Staff => role == UserRole::Staff,
            TargetRole::Verifikator => role == UserRole::Verifikator,
            TargetRole::AdminGudang => role == UserRole::AdminGudang,
        }
    }
}

impl From<UserRole> for TargetRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Staff => TargetRole::Staff,
            UserRole::Verifikator => TargetRole::Verifikator,
            UserRole::AdminGudang => TargetRole::AdminGudang,
        }
    }
}
