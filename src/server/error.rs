//! HTTP error type shared by every handler.
//!
//! Each variant maps to one status code and a stable machine-readable code.
//! Messages are returned verbatim to the client; this API serves a personal
//! site, so diagnosability wins over hiding internals.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::arena::ArenaError;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            Self::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: message.clone(),
                },
            ),
            Self::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "UNAUTHORIZED",
                    message: message.clone(),
                },
            ),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: message.clone(),
                },
            ),
            Self::Upstream { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                ErrorBody {
                    code: "UPSTREAM_ERROR",
                    message: message.clone(),
                },
            ),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: "INTERNAL_ERROR",
                    message: message.clone(),
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Map a channel fetch failure. A credential rejection upstream means our
/// token is bad, so the client sees 401 rather than a generic 500.
pub fn channel_error(err: ArenaError) -> AppError {
    if err.is_unauthorized() {
        AppError::Unauthorized("upstream rejected the API token".to_string())
    } else {
        AppError::Internal(err.to_string())
    }
}

/// Map a proxy fetch failure. Upstream status codes pass through so a 404 on
/// a moved file stays a 404 for the client.
pub fn proxy_error(err: ArenaError) -> AppError {
    match err.upstream_status() {
        Some(status) => AppError::Upstream {
            status,
            message: err.to_string(),
        },
        None => AppError::Internal(err.to_string()),
    }
}
