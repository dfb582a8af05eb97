//! Maps handler failures to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::approval::ApprovalError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Every violated rule, not just the first.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Invalid ID format")]
    InvalidId,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    /// A unique field is already taken. Reported as 400, not 409.
    #[error("{0}")]
    Conflict(&'static str),

    /// `message` is what the client sees; `cause` is only logged.
    #[error("{message}: {cause:#}")]
    Internal {
        message: &'static str,
        cause: anyhow::Error,
    },
}

impl ApiError {
    /// For `map_err`: wraps an unexpected failure under a fixed, route-specific message.
    pub fn internal<E>(message: &'static str) -> impl FnOnce(E) -> ApiError
    where
        E: Into<anyhow::Error>,
    {
        move |cause| ApiError::Internal {
            message,
            cause: cause.into(),
        }
    }

    pub fn from_approval(
        err: ApprovalError,
        not_found: &'static str,
        internal: &'static str,
    ) -> Self {
        match err {
            ApprovalError::NotFound => ApiError::NotFound(not_found),
            ApprovalError::Store(cause) => ApiError::Internal {
                message: internal,
                cause,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::InvalidId => error_body(StatusCode::BAD_REQUEST, "Invalid ID format"),
            ApiError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, msg),
            ApiError::Unauthenticated(msg) => error_body(StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => error_body(StatusCode::FORBIDDEN, msg),
            ApiError::Conflict(msg) => error_body(StatusCode::BAD_REQUEST, msg),
            ApiError::Internal { message, cause } => {
                error!("{}: {:#}", message, cause);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
