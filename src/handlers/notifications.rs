use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::created_response,
    services::notifications::{NewNotification, NotificationFeed, NotificationView},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use serde_json::{json, Value};
use uuid::Uuid;

/// Notices addressed to the caller's role or to everyone
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Feed with unread count", body = ApiResponse<NotificationFeed>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<NotificationFeed> {
    let feed = state.services.notifications.feed(&user).await?;
    Ok(Json(ApiResponse::success(feed)))
}

/// Broadcast a notice
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = NewNotification,
    responses(
        (status = 201, description = "Notice sent", body = ApiResponse<NotificationView>),
        (status = 400, description = "Title or message missing", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn send_notification(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NewNotification>,
) -> Result<(StatusCode, Json<ApiResponse<NotificationView>>), ServiceError> {
    let notice = state.services.notifications.send(payload, &user).await?;
    Ok(created_response(notice))
}

/// Mark one notice as read
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Notification not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    state.services.notifications.mark_read(id, &user).await?;
    Ok(Json(ApiResponse::success(json!({ "id": id, "read": true }))))
}

/// Mark the whole feed as read
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Number of notices newly marked read")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_all_read(State(state): State<AppState>, user: AuthUser) -> ApiResult<Value> {
    let changed = state.services.notifications.mark_all_read(&user).await?;
    Ok(Json(ApiResponse::success(json!({ "marked": changed }))))
}
