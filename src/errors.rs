use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::i18n;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Bad Request",
    "code": "ITEM_REJECTION_NOTE_REQUIRED",
    "message": "Catatan penolakan wajib diisi.",
    "details": "rejection requires a non-empty note",
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    #[schema(example = "Not Found")]
    pub error: String,
    /// Stable machine-readable error code
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    /// Localized, user-facing description
    #[schema(example = "Data tidak ditemukan.")]
    pub message: String,
    /// Diagnostic detail for client errors; omitted for internal failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "req-abc123xyz")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    #[schema(example = "2024-12-09T10:30:00.000Z")]
    pub timestamp: String,
}

/// Business rules a request can break. Each one has its own code and
/// localized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("rejection requires a non-empty note")]
    RejectionNoteRequired,
    #[error("target status must be approved or rejected")]
    InvalidTargetStatus,
    #[error("item is no longer pending")]
    ItemNotPending,
    #[error("item was changed by another user while being verified")]
    ConcurrentVerification,
    #[error("location is required")]
    LocationRequired,
    #[error("quantity must be at least 1")]
    QuantityTooSmall,
    #[error("quantity must not be negative")]
    NegativeQuantity,
    #[error("quantity must be a whole number for this kind")]
    FractionalQuantity,
    #[error("material name is required")]
    MaterialNameRequired,
    #[error("material code is required")]
    MaterialCodeRequired,
    #[error("edit request contains no changes")]
    EmptyEdit,
    #[error("only pending items can be edited by their creator")]
    ItemLocked,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email format")]
    InvalidEmail,
    #[error("password must be at least 6 characters")]
    WeakPassword,
    #[error("name is required")]
    NameRequired,
    #[error("administrators cannot deactivate themselves")]
    SelfDeactivation,
    #[error("notification title and message are required")]
    NotificationIncomplete,
    #[error("no data to export")]
    NothingToExport,
}

impl RuleViolation {
    pub fn code(&self) -> &'static str {
        match self {
            Self::RejectionNoteRequired => i18n::codes::REJECTION_NOTE_REQUIRED,
            Self::InvalidTargetStatus => i18n::codes::INVALID_TARGET_STATUS,
            Self::ItemNotPending => i18n::codes::ITEM_NOT_PENDING,
            Self::ConcurrentVerification => i18n::codes::CONCURRENT_VERIFICATION,
            Self::LocationRequired => i18n::codes::LOCATION_REQUIRED,
            Self::QuantityTooSmall => i18n::codes::QUANTITY_TOO_SMALL,
            Self::NegativeQuantity => i18n::codes::NEGATIVE_QUANTITY,
            Self::FractionalQuantity => i18n::codes::FRACTIONAL_QUANTITY,
            Self::MaterialNameRequired => i18n::codes::MATERIAL_NAME_REQUIRED,
            Self::MaterialCodeRequired => i18n::codes::MATERIAL_CODE_REQUIRED,
            Self::EmptyEdit => i18n::codes::EMPTY_EDIT,
            Self::ItemLocked => i18n::codes::ITEM_LOCKED,
            Self::EmailTaken => i18n::codes::EMAIL_TAKEN,
            Self::InvalidEmail => i18n::codes::INVALID_EMAIL,
            Self::WeakPassword => i18n::codes::WEAK_PASSWORD,
            Self::NameRequired => i18n::codes::NAME_REQUIRED,
            Self::SelfDeactivation => i18n::codes::SELF_DEACTIVATION,
            Self::NotificationIncomplete => i18n::codes::NOTIFICATION_INCOMPLETE,
            Self::NothingToExport => i18n::codes::NOTHING_TO_EXPORT,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ItemNotPending | Self::ConcurrentVerification | Self::EmailTaken => {
                StatusCode::CONFLICT
            }
            Self::ItemLocked | Self::SelfDeactivation => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    Rule(#[from] RuleViolation),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl ServiceError {
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {} not found", resource, id))
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Rule(rule) => rule.status_code(),
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_)
            | Self::EventError(_)
            | Self::HashError(_)
            | Self::SerializationError(_)
            | Self::InternalError(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code used for localization and by clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => i18n::codes::NOT_FOUND,
            Self::ValidationError(_) | Self::BadRequest(_) => i18n::codes::VALIDATION_ERROR,
            Self::Rule(rule) => rule.code(),
            Self::Unauthorized(_) => i18n::codes::UNAUTHORIZED,
            Self::Forbidden(_) => i18n::codes::FORBIDDEN,
            Self::Conflict(_) => i18n::codes::CONFLICT,
            _ => i18n::codes::INTERNAL_ERROR,
        }
    }

    /// Localized, user-facing message for this error.
    pub fn response_message(&self) -> &'static str {
        i18n::localize(self.code())
    }

    /// Returns the diagnostic detail suitable for HTTP responses.
    /// Internal errors return nothing to avoid leaking implementation details.
    pub fn response_details(&self) -> Option<String> {
        if self.status_code().is_server_error() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let code = self.code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            code: code.to_string(),
            message: self.response_message().to_string(),
            details: self.response_details(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}
