use crate::{
    auth::{AuthUser, UserProfile},
    errors::ServiceError,
    handlers::common::created_response,
    services::users::{NewUser, UserUpdate},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    /// At least six characters
    pub password: String,
}

/// List all accounts, newest first
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Accounts", body = ApiResponse<Vec<UserProfile>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<UserProfile>> {
    let users = state.services.users.list().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// Create an account
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserProfile>),
        (status = 400, description = "Invalid account data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserProfile>>), ServiceError> {
    let user = state.services.users.create(payload).await?;
    Ok(created_response(user))
}

/// Change name or role
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<UserProfile>),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> ApiResult<UserProfile> {
    let user = state.services.users.update(id, payload).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// Activate or deactivate an account
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/status",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Activation changed", body = ApiResponse<UserProfile>),
        (status = 403, description = "Cannot deactivate yourself", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn set_user_status(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> ApiResult<UserProfile> {
    let user = state
        .services
        .users
        .set_active(id, payload.active, actor.user_id)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

/// Set a new password for an account
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/password",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Password too weak", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Value> {
    state
        .services
        .users
        .reset_password(id, &payload.password)
        .await?;
    Ok(Json(ApiResponse::success(json!({ "id": id, "reset": true }))))
}
