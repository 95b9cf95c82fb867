use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::created_response,
    models::MaterialCatalogEntry,
    services::materials::NewMaterial,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaterialQuery {
    /// Matches code, name or category, case-insensitively
    pub search: Option<String>,
    /// Exact category
    pub category: Option<String>,
}

/// Search the merged material catalog
#[utoipa::path(
    get,
    path = "/api/v1/materials",
    params(MaterialQuery),
    responses(
        (status = 200, description = "Catalog entries", body = ApiResponse<Vec<MaterialCatalogEntry>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialQuery>,
) -> ApiResult<Vec<MaterialCatalogEntry>> {
    let entries = state
        .services
        .materials
        .list(query.search.as_deref(), query.category.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// Distinct catalog categories
#[utoipa::path(
    get,
    path = "/api/v1/materials/categories",
    responses(
        (status = 200, description = "Categories, sorted", body = ApiResponse<Vec<String>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let categories = state.services.materials.categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// Add or replace a runtime catalog entry
#[utoipa::path(
    post,
    path = "/api/v1/materials",
    request_body = NewMaterial,
    responses(
        (status = 201, description = "Entry saved", body = ApiResponse<MaterialCatalogEntry>),
        (status = 400, description = "Code or name missing", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn add_material(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NewMaterial>,
) -> Result<(StatusCode, Json<ApiResponse<MaterialCatalogEntry>>), ServiceError> {
    let entry = state.services.materials.add(payload, &user).await?;
    Ok(created_response(entry))
}
