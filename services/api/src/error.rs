//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for startup failures
//! in the binary and `HttpError` for failures inside a request handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use studyspark_core::ports::PortError;
use tracing::error;
use utoipa::ToSchema;

use crate::config::ConfigError;

/// The primary startup error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying the schema migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

/// An error raised while handling a single HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request body or parameters failed validation.
    #[error("{0}")]
    BadRequest(String),

    /// The addressed entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A storage or AI provider failure. The cause is logged, never returned.
    #[error("Internal error: {0}")]
    Internal(#[from] PortError),
}

impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError::BadRequest(message.into())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            HttpError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            HttpError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            HttpError::Internal(cause) => {
                error!("Request failed: {}", cause);
                let message = match cause {
                    PortError::Provider(_) => "AI request failed",
                    PortError::Storage(_) | PortError::Unexpected(_) => "Internal server error",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

/// Shorthand for handler return values.
pub type HttpResult<T> = Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(
            HttpError::bad_request("name is required").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HttpError::NotFound("Subject").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::from(PortError::Storage("connection reset".to_string()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(HttpError::NotFound("Note").to_string(), "Note not found");
    }
}
