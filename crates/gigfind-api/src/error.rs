//! HTTP error type. Every failure renders as `{ "success": false, "error" }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use gigfind_core::DomainError;
use gigfind_types::api::ApiResponse;

pub type ApiResult<T> = Result<T, ApiError>;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Details are logged where the error is created, never sent.
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Log `err` and return the opaque 500.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, err);
        Self::Internal
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::InvalidState(msg) => ApiError::BadRequest(msg),
            DomainError::Storage(e) => ApiError::internal("Storage error", format!("{:#}", e)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Internal => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        };
        (status, Json(ApiResponse::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_mapping() {
        let cases = [
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN),
            (DomainError::conflict("x"), StatusCode::CONFLICT),
            (DomainError::invalid_state("x"), StatusCode::BAD_REQUEST),
            (
                DomainError::Storage(anyhow::anyhow!("disk on fire")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (domain, status) in cases {
            assert_eq!(ApiError::from(domain).status_code(), status);
        }
    }

    #[test]
    fn test_internal_hides_detail() {
        let err = ApiError::from(DomainError::Storage(anyhow::anyhow!("secret path")));
        assert_eq!(err.to_string(), INTERNAL_MESSAGE);
    }
}
