//! Gudang API Library
//!
//! Backend for the returned-materials warehouse of PLN ULP Tabing: item
//! submission and verification, the material catalog, accounts, broadcast
//! notices and reports.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod i18n;
pub mod lifecycle;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;
pub mod views;

use axum::{
    extract::State,
    response::Json,
    routing::{get, patch, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::consts as perm;
use crate::auth::{AuthRouterExt, AuthService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
    pub auth_service: Arc<AuthService>,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validasi gagal".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_carries_message_and_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("gagal".into())
            })
            .await;

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("gagal"));
        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
    }

    #[test]
    fn validation_errors_are_listed() {
        let response = ApiResponse::<()>::validation_errors(vec!["search".into()]);
        assert_eq!(response.errors, Some(vec!["search".to_string()]));
        assert!(response.meta.is_some());
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Routes under `/api/v1`, each group gated by one permission.
pub fn api_v1_routes() -> Router<AppState> {
    use handlers::{items, materials, notifications, reports, users};

    let items_read = Router::new()
        .route("/items", get(items::list_items::<AppState>))
        .route("/items/stream", get(items::stream_items::<AppState>))
        .route("/items/:id", get(items::get_item::<AppState>))
        .with_permission(perm::ITEMS_READ);

    let items_create = Router::new()
        .route("/items", post(items::create_item::<AppState>))
        .with_permission(perm::ITEMS_CREATE);

    let items_update = Router::new()
        .route("/items/:id", patch(items::update_item::<AppState>))
        .with_permission(perm::ITEMS_UPDATE);

    let items_verify = Router::new()
        .route("/items/:id/approve", post(items::approve_item::<AppState>))
        .route("/items/:id/reject", post(items::reject_item::<AppState>))
        .with_permission(perm::ITEMS_VERIFY);

    let items_delete = Router::new()
        .route(
            "/items/:id",
            axum::routing::delete(items::delete_item::<AppState>),
        )
        .with_permission(perm::ITEMS_DELETE);

    let materials_read = Router::new()
        .route("/materials", get(materials::list_materials))
        .route("/materials/categories", get(materials::list_categories))
        .with_permission(perm::MATERIALS_READ);

    let materials_create = Router::new()
        .route("/materials", post(materials::add_material))
        .with_permission(perm::MATERIALS_CREATE);

    let users_manage = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/:id", put(users::update_user))
        .route("/users/:id/status", put(users::set_user_status))
        .route("/users/:id/password", put(users::reset_password))
        .with_permission(perm::USERS_MANAGE);

    let notifications_read = Router::new()
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/:id/read", post(notifications::mark_read))
        .with_permission(perm::NOTIFICATIONS_READ);

    let notifications_send = Router::new()
        .route("/notifications", post(notifications::send_notification))
        .with_permission(perm::NOTIFICATIONS_SEND);

    let reports_read = Router::new()
        .route("/reports/summary", get(reports::summary))
        .route("/reports/export", get(reports::export))
        .with_permission(perm::REPORTS_READ);

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Items
        .merge(items_read)
        .merge(items_create)
        .merge(items_update)
        .merge(items_verify)
        .merge(items_delete)
        // Material catalog
        .merge(materials_read)
        .merge(materials_create)
        // Accounts
        .merge(users_manage)
        // Notifications
        .merge(notifications_read)
        .merge(notifications_send)
        // Reports
        .merge(reports_read)
}

/// The complete application: `/api/v1`, `/auth`, Swagger UI, request ids and
/// HTTP tracing. Deployment concerns such as CORS and compression are added
/// by the binary.
pub fn app_router(state: AppState) -> Router {
    let auth_service = state.auth_service.clone();

    Router::<AppState>::new()
        .route("/", get(|| async { "gudang-api up" }))
        .nest("/api/v1", api_v1_routes())
        .nest(
            "/auth",
            auth::auth_routes().with_state(auth_service.clone()),
        )
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::Extension(auth_service))
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_time = option_env!("BUILD_TIME").unwrap_or("unknown");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "git": git,
        "build_time": build_time,
        "service": "gudang-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(()) => "healthy",
        Err(err) => {
            ::tracing::warn!(error = %err, "Health check: database unreachable");
            "unhealthy"
        }
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
            "change_feed_subscribers": state.services.inventory.feed().subscriber_count(),
        },
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

pub mod prelude {
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::models::*;
    pub use crate::openapi::*;
    pub use crate::tracing::*;
    pub use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};
}
