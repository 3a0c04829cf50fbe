use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use quill_auth::{LoginError, RegistrationError, StoreError};
use quill_infra::ContentError;

/// Every error the HTTP surface can emit. Bodies are `{"detail": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Several user-facing messages at once (password policy).
    #[error("{}", .0.join(" "))]
    Invalid(Vec<String>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authorized")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    /// Cause is logged, never returned.
    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(detail) => json_error(StatusCode::BAD_REQUEST, detail),
            ApiError::Invalid(details) => (StatusCode::BAD_REQUEST, axum::Json(json!({ "detail": details }))).into_response(),
            ApiError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::InvalidCredentials => json_error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
            ApiError::Forbidden => json_error(StatusCode::FORBIDDEN, "Not authorized"),
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "Not found"),
            ApiError::Internal(cause) => {
                tracing::error!(%cause, "request failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

pub fn json_error(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "detail": detail.into() }))).into_response()
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<RegistrationError> for ApiError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::PasswordPolicy(violations) => {
                ApiError::Invalid(violations.iter().map(ToString::to_string).collect())
            }
            RegistrationError::InvalidUsername
            | RegistrationError::InvalidEmail
            | RegistrationError::DuplicateUsername
            | RegistrationError::DuplicateEmail => ApiError::BadRequest(e.to_string()),
            RegistrationError::Hashing(e) => ApiError::Internal(e.to_string()),
            RegistrationError::Store(e) => e.into(),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::InvalidCredentials => ApiError::InvalidCredentials,
            LoginError::Store(e) => e.into(),
            LoginError::Hashing(e) => ApiError::Internal(e.to_string()),
            LoginError::Issue(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::NotFound => ApiError::NotFound,
            ContentError::Forbidden => ApiError::Forbidden,
            ContentError::Validation(e) => ApiError::BadRequest(e.to_string()),
            ContentError::Unavailable(cause) => ApiError::Internal(cause),
        }
    }
}
