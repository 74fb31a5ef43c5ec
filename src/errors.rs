//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic conversion into the failure envelope.

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::types::{ApiResponse, ErrorBody};

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Balance rules
    #[error("Amount must be greater than zero, with at most 4 decimal places, and keep the balance in range")]
    InvalidAmount,

    #[error("Balance not found")]
    BalanceNotFound,

    // Tiered deletion rules
    #[error("Current user not found")]
    ActingUserNotFound,

    #[error("Target user not found")]
    TargetUserNotFound,

    #[error("You cannot delete yourself")]
    SelfDeletionForbidden,

    #[error("You cannot delete this user")]
    InsufficientTier,

    // Authentication
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // External service errors
    #[error("Store failure: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidAmount => "INVALID_AMOUNT",
            AppError::BalanceNotFound => "BALANCE_NOT_FOUND",
            AppError::ActingUserNotFound => "ACTING_USER_NOT_FOUND",
            AppError::TargetUserNotFound => "TARGET_USER_NOT_FOUND",
            AppError::SelfDeletionForbidden => "SELF_DELETION_FORBIDDEN",
            AppError::InsufficientTier => "INSUFFICIENT_TIER",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Database(_) => "STORE_FAILURE",
            AppError::Jwt(_) => "AUTH_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized
            | AppError::InvalidCredentials
            | AppError::ActingUserNotFound
            | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::SelfDeletionForbidden | AppError::InsufficientTier => StatusCode::FORBIDDEN,
            AppError::BalanceNotFound | AppError::TargetUserNotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidAmount | AppError::Validation(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message
    fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),

            // Store failures are opaque to the core; pass the message through.
            AppError::Database(e) => {
                tracing::error!("Store failure: {:?}", e);
                self.to_string()
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }

    /// Render the error as the failure envelope body
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status().as_u16(),
            code: self.code().to_string(),
            message: self.user_message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiResponse::failure(self.to_body()).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected JSON body: {}", rejection.body_text());
        AppError::bad_request("Invalid request body")
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!("Rejected form body: {}", rejection.body_text());
        AppError::bad_request("Invalid form value")
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path parameter: {}", rejection.body_text());
        AppError::bad_request("invalid user id")
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_statuses() {
        assert_eq!(AppError::InvalidAmount.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::BalanceNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::ActingUserNotFound.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TargetUserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::SelfDeletionForbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InsufficientTier.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_store_failure_message_passes_through() {
        let err = AppError::from(sea_orm::DbErr::Custom("connection reset".to_string()));
        let body = err.to_body();

        assert_eq!(body.status, 500);
        assert_eq!(body.code, "STORE_FAILURE");
        assert!(body.message.contains("connection reset"));
    }

    #[test]
    fn test_internal_message_hidden() {
        let body = AppError::internal("secret detail").to_body();
        assert_eq!(body.message, "An internal error occurred");
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = AppError::InsufficientTier.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
