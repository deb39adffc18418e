/// Unified error types for the Shareon backend
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ApiResponse;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Client input errors, possibly aggregated from several checks
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Missing entity
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad credentials. Never distinguishes unknown user from wrong password.
    #[error("Failed to authenticate user")]
    Authentication,

    /// Confirmation/reset token mismatch, reuse or expiry
    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    /// Email transport failure
    #[error("Email delivery failed: {0}")]
    Delivery(String),

    /// Eager-load path that no entity knows how to resolve
    #[error("Unknown relation path '{path}' for {entity}")]
    UnknownRelation { entity: &'static str, path: String },

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-message validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }
}

/// Convert AppError to an HTTP response wrapped in the standard envelope
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, "Request failed.".to_string(), errors)
            }
            AppError::NotFound(_) => {
                (StatusCode::NOT_FOUND, "Request failed.".to_string(), vec![self.to_string()])
            }
            AppError::Authentication => (
                StatusCode::UNAUTHORIZED,
                "Login failed.".to_string(),
                vec![self.to_string()],
            ),
            AppError::TokenInvalid(_) => {
                (StatusCode::BAD_REQUEST, "Request failed.".to_string(), vec![self.to_string()])
            }
            AppError::Delivery(_) => {
                (StatusCode::BAD_REQUEST, "Request failed.".to_string(), vec![self.to_string()])
            }
            AppError::Database(_) | AppError::Internal(_) | AppError::UnknownRelation { .. } => {
                tracing::error!(error = %self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Request failed.".to_string(),
                    // Don't leak details
                    vec!["Internal server error".to_string()],
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(errors, message));

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type AppResult<T> = Result<T, AppError>;
