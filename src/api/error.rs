//! API error handling for consistent JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::join::JoinFlowError;
use crate::session::CreationError;

/// API error type that converts to JSON responses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": true,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<CreationError> for ApiError {
    fn from(err: CreationError) -> Self {
        match err {
            CreationError::MissingDateTime => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Please select a date and time",
            ),
            CreationError::RemoteFailure(e) => Self::new(
                StatusCode::BAD_GATEWAY,
                format!("Failed to create meeting: {:#}", e),
            ),
        }
    }
}

impl From<JoinFlowError> for ApiError {
    fn from(err: JoinFlowError) -> Self {
        let status = match err {
            JoinFlowError::ResolveTimeout(..) => StatusCode::GATEWAY_TIMEOUT,
            JoinFlowError::CallNotFound(_) => StatusCode::NOT_FOUND,
            JoinFlowError::NotAwaitingSetup(_) => StatusCode::CONFLICT,
        };
        Self::new(status, err.to_string())
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
