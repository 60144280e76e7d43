//! Error types for the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json
};
use errors::ProcessError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body failed field validation before processing.
    #[error("Request validation failed")]
    RequestValidation(#[from] validator::ValidationErrors),

    /// Note processing failed.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] errors::ConfigError),

    /// Server startup error.
    #[error("Server error: {0}")]
    Server(String)
}

/// Error response body for HTTP endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::RequestValidation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "Request validation failed".to_string(),
                Some(errors.to_string())
            ),
            // Upstream detail is logged, never echoed: provider error bodies
            // can carry endpoint and credential fragments.
            Self::Process(e @ ProcessError::InvalidRequest { field, reason }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                e.kind().as_str(),
                format!("Invalid request: {field}: {reason}"),
                None
            ),
            Self::Process(e @ ProcessError::UpstreamCallFailed { .. }) => {
                tracing::error!(error = ?e, "Upstream LLM call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    e.kind().as_str(),
                    "The language model service is currently unavailable".to_string(),
                    None
                )
            }
            Self::Process(e) => {
                tracing::error!(error = %e, "Model output rejected");
                (
                    StatusCode::BAD_GATEWAY,
                    e.kind().as_str(),
                    "The language model returned an unusable response".to_string(),
                    None
                )
            }
            Self::Configuration(e) => {
                tracing::error!(error = %e, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "The service is misconfigured".to_string(),
                    None
                )
            }
            Self::Server(msg) => {
                tracing::error!(message = %msg, "Server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_ERROR",
                    "An internal error occurred".to_string(),
                    None
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details
        };

        (status, Json(body)).into_response()
    }
}
