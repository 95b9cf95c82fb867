use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::RuleViolation;

/// Suggested storage racks offered by the entry forms.
pub const LOCATIONS: [&str; 7] = [
    "Rak 1", "Rak 2", "Rak 3", "Rak 4", "Rak 5", "Rak 6", "Rak 7",
];

/// Verification state of a submitted item.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ItemStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "Menunggu",
            ItemStatus::Approved => "Disetujui",
            ItemStatus::Rejected => "Ditolak",
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ItemStatus::Pending),
            "approved" => Ok(ItemStatus::Approved),
            "rejected" => Ok(ItemStatus::Rejected),
            other => Err(format!("unknown item status: {}", other)),
        }
    }
}

/// Physical condition of a returned material.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Reusable ("material bekas handal")
    #[sea_orm(string_value = "andal")]
    Andal,
    /// Scrap
    #[sea_orm(string_value = "limbah")]
    Limbah,
}

impl Condition {
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Andal => "Material Bekas Handal",
            Condition::Limbah => "Material Limbah",
        }
    }
}

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
pub enum ItemKind {
    #[sea_orm(string_value = "tiang")]
    Tiang,
    #[sea_orm(string_value = "kwh_meter")]
    KwhMeter,
    #[sea_orm(string_value = "kabel")]
    Kabel,
    #[sea_orm(string_value = "material_umum")]
    MaterialUmum,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Tiang => "Tiang",
            ItemKind::KwhMeter => "KWH Meter",
            ItemKind::Kabel => "Kabel",
            ItemKind::MaterialUmum => "Material Umum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PoleMaterial {
    Beton,
    Besi,
    Kayu,
    Galvanis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PoleDetails {
    /// Number of poles
    pub volume: i64,
    pub pole_id: String,
    /// Height in metres
    pub height: f64,
    pub material: PoleMaterial,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MeterDetails {
    pub brand: String,
    pub seal_number: String,
    pub meter_id: String,
    pub quantity: i64,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CableDetails {
    pub description: String,
    /// Length in metres
    pub length: f64,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaterialDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub quantity: i64,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Kind specific payload of an inventory item, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemDetails {
    Tiang(PoleDetails),
    KwhMeter(MeterDetails),
    Kabel(CableDetails),
    MaterialUmum(MaterialDetails),
}

impl ItemDetails {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemDetails::Tiang(_) => ItemKind::Tiang,
            ItemDetails::KwhMeter(_) => ItemKind::KwhMeter,
            ItemDetails::Kabel(_) => ItemKind::Kabel,
            ItemDetails::MaterialUmum(_) => ItemKind::MaterialUmum,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            ItemDetails::Tiang(d) => &d.location,
            ItemDetails::KwhMeter(d) => &d.location,
            ItemDetails::Kabel(d) => &d.location,
            ItemDetails::MaterialUmum(d) => &d.location,
        }
    }

    pub fn set_location(&mut self, location: String) {
        match self {
            ItemDetails::Tiang(d) => d.location = location,
            ItemDetails::KwhMeter(d) => d.location = location,
            ItemDetails::Kabel(d) => d.location = location,
            ItemDetails::MaterialUmum(d) => d.location = location,
        }
    }

    /// Amount on hand: pole volume, cable length, or piece count.
    pub fn quantity(&self) -> f64 {
        match self {
            ItemDetails::Tiang(d) => d.volume as f64,
            ItemDetails::KwhMeter(d) => d.quantity as f64,
            ItemDetails::Kabel(d) => d.length,
            ItemDetails::MaterialUmum(d) => d.quantity as f64,
        }
    }

    /// Overwrites the amount on hand. Counted kinds only accept whole numbers.
    pub fn set_quantity(&mut self, quantity: f64) -> Result<(), RuleViolation> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(RuleViolation::NegativeQuantity);
        }
        let whole = || {
            if quantity.fract() == 0.0 {
                Ok(quantity as i64)
            } else {
                Err(RuleViolation::FractionalQuantity)
            }
        };
        match self {
            ItemDetails::Tiang(d) => d.volume = whole()?,
            ItemDetails::KwhMeter(d) => d.quantity = whole()?,
            ItemDetails::Kabel(d) => d.length = quantity,
            ItemDetails::MaterialUmum(d) => d.quantity = whole()?,
        }
        Ok(())
    }

    /// Name shown in lists and reports.
    pub fn display_name(&self) -> String {
        match self {
            ItemDetails::Tiang(d) => format!("Tiang {}", d.pole_id),
            ItemDetails::KwhMeter(d) => format!("KWh Meter {}", d.meter_id),
            ItemDetails::Kabel(d) if d.description.trim().is_empty() => "Kabel".to_string(),
            ItemDetails::Kabel(d) => d.description.clone(),
            ItemDetails::MaterialUmum(d) => d.name.clone(),
        }
    }

    pub fn unit(&self) -> &str {
        match self {
            ItemDetails::MaterialUmum(d) => d
                .unit
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .unwrap_or("BH"),
            ItemDetails::Kabel(_) => "M",
            _ => "BH",
        }
    }

    /// Catalog category; only general materials carry one.
    pub fn category(&self) -> Option<&str> {
        match self {
            ItemDetails::MaterialUmum(d) => d.category.as_deref(),
            _ => None,
        }
    }

    /// Category column used by exports: the material category or the kind label.
    pub fn report_category(&self) -> String {
        match self {
            ItemDetails::MaterialUmum(d) => d.category.clone().unwrap_or_else(|| "-".into()),
            other => other.kind().label().to_string(),
        }
    }

    /// Text the free-text search looks at.
    pub fn searchable_text(&self) -> String {
        match self {
            ItemDetails::Tiang(d) => format!("tiang {} {:?}", d.pole_id, d.material),
            ItemDetails::KwhMeter(d) => {
                format!("kwh meter {} {} {}", d.meter_id, d.brand, d.seal_number)
            }
            ItemDetails::Kabel(d) => format!("kabel {}", d.description),
            ItemDetails::MaterialUmum(d) => [
                Some(d.name.as_str()),
                d.catalog_code.as_deref(),
                d.category.as_deref(),
                d.serial_number.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" "),
        }
    }
}

/// A submitted warehouse item and its verification state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InventoryItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: ItemDetails,
    pub condition: Condition,
    pub status: ItemStatus,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub verified_by: Option<Uuid>,
    pub verified_by_name: Option<String>,
    pub rejection_note: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn kind(&self) -> ItemKind {
        self.details.kind()
    }

    pub fn is_pending(&self) -> bool {
        self.status == ItemStatus::Pending
    }
}
