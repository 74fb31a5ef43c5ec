//! Response envelope shared by every endpoint.
//!
//! Success: `{"data": ..., "meta": ..., "error": null}`
//! Failure: `{"data": null, "meta": null, "error": {"status", "code", "message"}}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Error details carried by a failure envelope
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub code: String,
    pub message: String,
}

/// Standard API response wrapper (DRY - consistent response format)
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub meta: Option<Value>,
    pub error: Option<ErrorBody>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
        }
    }

    pub fn with_meta(data: T, meta: Value) -> Self {
        Self {
            data: Some(data),
            meta: Some(meta),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(error: ErrorBody) -> Self {
        Self {
            data: None,
            meta: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self
            .error
            .as_ref()
            .and_then(|e| StatusCode::from_u16(e.status).ok())
            .unwrap_or(StatusCode::OK);

        (status, Json(self)).into_response()
    }
}

/// Created response helper (DRY - common pattern for POST endpoints)
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(ApiResponse::success(self.0))).into_response()
    }
}
