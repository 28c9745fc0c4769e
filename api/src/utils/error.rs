use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::RpcStatus;
use std::fmt;

use crate::db::StoreError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Error taxonomy shared by both transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed request body or parameters
    #[serde(rename = "ValidationError")]
    Validation,
    /// Missing, invalid or expired token, or a token for a vanished user
    #[serde(rename = "AuthenticationError")]
    Authentication,
    #[serde(rename = "NotFoundError")]
    NotFound,
    /// Duplicate login or duplicate (user, record id)
    #[serde(rename = "ConflictError")]
    Conflict,
    #[serde(rename = "InternalError")]
    Internal,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn rpc_status(self) -> RpcStatus {
        match self {
            ErrorKind::Validation => RpcStatus::InvalidArgument,
            ErrorKind::Authentication => RpcStatus::Unauthenticated,
            ErrorKind::NotFound => RpcStatus::NotFound,
            ErrorKind::Conflict => RpcStatus::AlreadyExists,
            ErrorKind::Internal => RpcStatus::Internal,
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.error, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.error.status_code(), Json(self)).into_response()
    }
}

impl ApiError {
    pub fn new(error: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn authentication_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn not_found_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    pub fn rpc_status(&self) -> RpcStatus {
        self.error.rpc_status()
    }
}

impl From<&ApiError> for RpcStatus {
    fn from(err: &ApiError) -> Self {
        err.rpc_status()
    }
}

// From implementations for common error types
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Internal error: {}", err);
        Self::internal_error("Internal server error")
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation_error(format!("JSON parsing error: {}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation_error("Invalid request body")
            .with_details(serde_json::json!({ "reason": rejection.body_text() }))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::conflict_error("Record already exists"),
            StoreError::NotFound => Self::not_found_error("Record not found"),
            StoreError::Database(e) => {
                tracing::error!("Database error: {}", e);
                Self::internal_error("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::validation_error("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::authentication_error("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::not_found_error("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::conflict_error("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::internal_error("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rpc_mapping_matches_http_mapping() {
        assert_eq!(ApiError::conflict_error("x").rpc_status(), RpcStatus::AlreadyExists);
        assert_eq!(ApiError::not_found_error("x").rpc_status(), RpcStatus::NotFound);
        assert_eq!(
            ApiError::authentication_error("x").rpc_status(),
            RpcStatus::Unauthenticated
        );
        assert_eq!(
            ApiError::validation_error("x").rpc_status(),
            RpcStatus::InvalidArgument
        );
        assert_eq!(ApiError::internal_error("x").rpc_status(), RpcStatus::Internal);
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_value(ApiError::conflict_error("taken")).unwrap();
        assert_eq!(json["error"], "ConflictError");
        assert_eq!(json["message"], "taken");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_rpc_status_from_error_reference() {
        let err = ApiError::conflict_error("taken");
        assert_eq!(RpcStatus::from(&err), RpcStatus::AlreadyExists);
    }

    #[test]
    fn test_database_errors_do_not_leak() {
        let err = ApiError::from(StoreError::Database(sqlx::Error::RowNotFound));
        assert_eq!(err.error, ErrorKind::Internal);
        assert_eq!(err.message, "Internal server error");
    }
}
