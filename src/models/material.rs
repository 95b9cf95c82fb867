use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// One PLN SAP material code with its unit and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct MaterialCatalogEntry {
    #[validate(length(min = 1, max = 32))]
    #[schema(example = "000000003130028")]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "MCB 1P 6A")]
    pub name: String,
    #[validate(length(min = 1, max = 16))]
    #[schema(example = "BH")]
    pub unit: String,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "MCB")]
    pub category: String,
}

impl MaterialCatalogEntry {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            unit: unit.into(),
            category: category.into(),
        }
    }
}
