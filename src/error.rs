//! Domain error types for the media file server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Body returned for every protected-file denial, whatever the cause.
pub const PERMISSION_DENIED_MESSAGE: &str = "Media file does not exist or permission denied";

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// File missing, not a regular file, or outside its root.
    /// The inner detail is logged, never sent to the client.
    #[error("File not found")]
    NotFound(String),

    /// Protected file denied (unknown record, missing or failed permission check)
    #[error("Media file does not exist or permission denied")]
    PermissionDenied,

    /// Requested range starts at or beyond the end of the file
    #[error("Requested range not satisfiable for size {0}")]
    RangeNotSatisfiable(u64),

    /// Presented credentials were not recognised
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Required setting absent or unusable
    #[error("Misconfigured: {0}")]
    Misconfigured(String),

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::RangeNotSatisfiable(_) => StatusCode::RANGE_NOT_SATISFIABLE,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Misconfigured(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_code, response_message) = match self {
            AppError::NotFound(detail) => {
                tracing::debug!("File not found: {}", detail);
                ("NOT_FOUND", self.to_string())
            }
            AppError::PermissionDenied => {
                return HttpResponse::build(status).json(DeniedResponse {
                    error: PERMISSION_DENIED_MESSAGE.to_string(),
                });
            }
            AppError::RangeNotSatisfiable(size) => {
                return HttpResponse::build(status)
                    .insert_header((header::CONTENT_RANGE, format!("bytes */{}", size)))
                    .json(ErrorResponse {
                        error: "RANGE_NOT_SATISFIABLE".to_string(),
                        message: self.to_string(),
                    });
            }
            AppError::Unauthorized(_) => ("UNAUTHORIZED", self.to_string()),
            AppError::Misconfigured(detail) => {
                tracing::error!("Misconfiguration: {}", detail);
                (
                    "MISCONFIGURED",
                    "The file server is not configured correctly".to_string(),
                )
            }
            AppError::Io(detail) => {
                tracing::error!("I/O error: {}", detail);
                ("IO_ERROR", "An internal file error occurred".to_string())
            }
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Uniform denial body for protected files.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct DeniedResponse {
    pub error: String,
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound(err.to_string()),
            _ => AppError::Io(err.to_string()),
        }
    }
}
