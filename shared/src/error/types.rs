//! AppError and the JSON error body

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error carried from the stores and services up to the HTTP layer.
///
/// `details` holds machine-readable context such as the balance that
/// rejected a debit or the barcode that collided.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Map<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// A debit larger than the customer's point balance
    pub fn insufficient_points(current: i64, requested: i64) -> Self {
        Self::new(ErrorCode::InsufficientPoints).with_balance(current, requested)
    }

    /// A stock decrement below zero (reward or presentation)
    pub fn insufficient_stock(current: i64, requested: i64) -> Self {
        Self::new(ErrorCode::InsufficientStock).with_balance(current, requested)
    }

    fn with_balance(self, current: i64, requested: i64) -> Self {
        self.with_detail("current", current)
            .with_detail("requested", requested)
    }
}

/// Body of every non-2xx response except the reconciliation conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl ApiResponse {
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error");
        }
        (self.http_status(), axum::Json(ApiResponse::error(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message_comes_from_code() {
        let err = AppError::new(ErrorCode::CustomerNotFound);
        assert_eq!(err.message, "Customer not found");
        assert!(err.details.is_none());
        assert_eq!(err.to_string(), "Customer not found");
    }

    #[test]
    fn test_insufficient_points_carries_balance() {
        let err = AppError::insufficient_points(30, -50);
        assert_eq!(err.http_status(), StatusCode::UNPROCESSABLE_ENTITY);
        let details = err.details.unwrap();
        assert_eq!(details["current"], 30);
        assert_eq!(details["requested"], -50);
    }

    #[test]
    fn test_error_body_shape() {
        let err = AppError::new(ErrorCode::BarcodeExists).with_detail("barcode", "7861000000017");
        let body = serde_json::to_value(ApiResponse::error(&err)).unwrap();
        assert_eq!(body["code"], 6003);
        assert_eq!(body["message"], "Barcode already exists");
        assert_eq!(body["details"]["barcode"], "7861000000017");

        let body = serde_json::to_value(ApiResponse::error(&AppError::validation("x"))).unwrap();
        assert!(body.get("details").is_none());
    }
}
