//! Error types for arena-ui
//!
//! Session errors are recoverable: they come back as 4xx JSON bodies and the
//! session stays usable.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., stale round or wrong phase
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// arena-common error
    #[error(transparent)]
    Common(#[from] arena_common::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        use arena_common::Error as E;

        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Common(err) => match err {
                E::NoImagesProvided => (StatusCode::BAD_REQUEST, "NO_IMAGES_PROVIDED"),
                E::InsufficientModels { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_MODELS"),
                E::NoMatchedPairs { .. } => (StatusCode::BAD_REQUEST, "NO_MATCHED_PAIRS"),
                E::InvalidChoice(_) => (StatusCode::BAD_REQUEST, "INVALID_CHOICE"),
                E::InvalidState(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
                E::CatalogFetch(_) => (StatusCode::BAD_GATEWAY, "CATALOG_FETCH_FAILURE"),
                E::InstructionLoad(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INSTRUCTION_LOAD_FAILURE")
                }
                E::Config(_) | E::Io(_) | E::Json(_) | E::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();
        let message = match &self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::Common(err) => err.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, error = %message, "Request failed");
        } else {
            tracing::debug!(code = error_code, error = %message, "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_failures_are_bad_requests() {
        let err = ApiError::from(arena_common::Error::NoImagesProvided);
        assert_eq!(err.parts(), (StatusCode::BAD_REQUEST, "NO_IMAGES_PROVIDED"));

        let err = ApiError::from(arena_common::Error::InsufficientModels { found: 1 });
        assert_eq!(err.parts().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_state_is_conflict() {
        let err = ApiError::from(arena_common::Error::InvalidState("frozen".into()));
        assert_eq!(err.parts(), (StatusCode::CONFLICT, "INVALID_STATE"));
    }

    #[test]
    fn test_response_status() {
        let response = ApiError::NotFound("nothing".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
