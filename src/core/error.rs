//! Typed errors for the HTTP boundary
//!
//! Storage and service code works with `anyhow::Result`. Handlers convert
//! into [`ApiError`], which knows its HTTP status, a stable error code and the
//! JSON envelope it renders as.
//!
//! # Error Categories
//!
//! - [`EntityError`]: lookups and conflicts on records
//! - [`AuthError`]: missing, invalid or insufficient credentials
//! - [`ValidationError`]: malformed ids and payloads
//!
//! # Example
//!
//! ```rust,ignore
//! let record = collection
//!     .find_by_id(&id, &[])
//!     .await?
//!     .ok_or_else(|| EntityError::NotFound {
//!         entity_type: "patient".to_string(),
//!         id: id.to_string(),
//!     })?;
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Error returned by every HTTP handler
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failure reported by the document store
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of an error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,

    /// Human-readable error message
    pub message: String,

    /// Error code for programmatic handling
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Entity(e) => e.status_code(),
            ApiError::Auth(e) => e.status_code(),
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Entity(e) => e.error_code(),
            ApiError::Auth(e) => e.error_code(),
            ApiError::Validation(e) => e.error_code(),
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            message: self.to_string(),
            code: self.error_code().to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({ "entity_type": entity_type, "id": id }))
            }
            ApiError::Validation(ValidationError::FieldErrors(errors)) => {
                serde_json::to_value(errors)
                    .ok()
                    .map(|fields| serde_json::json!({ "fields": fields }))
            }
            ApiError::Auth(AuthError::Forbidden { required }) => {
                Some(serde_json::json!({ "required": required }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum EntityError {
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: String },
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
        }
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Authorization header must use the Bearer scheme")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing permission (requires one of: {required})")]
    Forbidden { required: String },

    #[error("Failed to issue token: {0}")]
    TokenEncoding(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated | AuthError::MalformedHeader | AuthError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::TokenEncoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated | AuthError::MalformedHeader | AuthError::InvalidToken(_) => {
                "UNAUTHENTICATED"
            }
            AuthError::Forbidden { .. } => "FORBIDDEN",
            AuthError::TokenEncoding(_) => "TOKEN_ENCODING_ERROR",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid id '{value}'")]
    InvalidId { value: String },

    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error("Validation failed")]
    FieldErrors(validator::ValidationErrors),
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidId { .. } => "INVALID_ID",
            ValidationError::InvalidPayload { .. } | ValidationError::FieldErrors(_) => {
                "VALIDATION_ERROR"
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(ValidationError::FieldErrors(errors))
    }
}
