//! Application error handling
//!
//! Every failure is rendered as a `{"status":"failed","message":...}`
//! envelope with a status code chosen by its [`ErrorKind`]. The rendered
//! response also carries a [`Failure`] extension so the compatibility layer
//! can flatten it afterwards.

use crate::auth::SessionError;
use crate::repositories::RepositoryError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use blog_shared::{Envelope, ErrorKind, PostValidationError};
use thiserror::Error;
use tracing::{error, warn};

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Kind and client-facing message of a rendered failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::ValidationFailed,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::Unavailable(_) => ErrorKind::Unavailable,
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show to clients
    fn client_message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::Unavailable(_) => "A required service is unavailable".to_string(),
            ApiError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => ApiError::Conflict("Resource already exists".to_string()),
            RepositoryError::Unavailable(msg) => ApiError::Unavailable(msg),
            RepositoryError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        if err.is_unavailable() {
            ApiError::Unavailable(err.to_string())
        } else {
            ApiError::Internal(err.into())
        }
    }
}

impl From<PostValidationError> for ApiError {
    fn from(err: PostValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(err) => error!("Internal error: {:?}", err),
            ApiError::Unavailable(msg) => error!("Dependency unavailable: {}", msg),
            other => warn!(kind = %other.kind(), "Request failed: {}", other),
        }

        let kind = self.kind();
        let message = self.client_message();
        let status =
            StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response =
            (status, Json(Envelope::<()>::failed(Some(message.clone())))).into_response();
        response.extensions_mut().insert(Failure { kind, message });
        response
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status() {
        let response = ApiError::Validation("Invalid input".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_status() {
        let response = ApiError::NotFound("post not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unauthorized_error_status() {
        let response = ApiError::Unauthorized("user not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_conflict_from_repository() {
        let err = ApiError::from(RepositoryError::Conflict("users_username_key".into()));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unavailable_from_repository() {
        let err = ApiError::from(RepositoryError::Unavailable("pool timed out".into()));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_internal_hides_details() {
        let err = ApiError::Internal(anyhow::anyhow!("secret detail"));
        let response = err.into_response();
        let failure = response.extensions().get::<Failure>().cloned().unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failure.kind, ErrorKind::Internal);
        assert!(!failure.message.contains("secret"));
    }
}
