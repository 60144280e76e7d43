//! # Clinical Notes Errors
//!
//! Error taxonomy for the clinical notes service.
//!
//! Three layers:
//! - [`LlmError`]: a single outbound chat-completion attempt failed.
//! - [`ProcessError`]: one note's processing failed; terminates the request.
//! - [`ConfigError`]: startup-time configuration failure.

use serde::Serialize;
use thiserror::Error;

/// Failure of a single chat-completion attempt against the provider.
///
/// The retry layer treats every variant as transient and retries uniformly;
/// only exhaustion of the retry budget surfaces to the caller.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("API request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Provider not configured: {missing}")]
    NotConfigured { missing: String },

    #[error("Timeout after {secs} seconds")]
    Timeout { secs: u64 }
}

/// Failure of one note's processing run.
///
/// Raised inside the orchestrator, these terminate the request; none of
/// them is retried beyond the LLM client's own internal retry budget.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Invalid request: {field}: {reason}")]
    InvalidRequest { field: String, reason: String },

    #[error("Upstream LLM call failed after {attempts} attempts")]
    UpstreamCallFailed {
        attempts: u32,
        #[source]
        source: LlmError
    },

    #[error("No JSON object found in model reply")]
    NoJsonFound,

    #[error("Model reply contained malformed JSON: {reason}")]
    MalformedJson { reason: String },

    #[error("Schema validation failed at {field}: {reason}")]
    SchemaValidationFailed { field: String, reason: String }
}

/// Machine-readable code for a [`ProcessError`], used in HTTP error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessErrorKind {
    ValidationError,
    UpstreamError,
    MalformedModelOutput,
    ModelSchemaError
}

impl ProcessErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::MalformedModelOutput => "MALFORMED_MODEL_OUTPUT",
            Self::ModelSchemaError => "MODEL_SCHEMA_ERROR"
        }
    }
}

impl ProcessError {
    pub fn kind(&self) -> ProcessErrorKind {
        match self {
            Self::InvalidRequest { .. } => ProcessErrorKind::ValidationError,
            Self::UpstreamCallFailed { .. } => ProcessErrorKind::UpstreamError,
            Self::NoJsonFound | Self::MalformedJson { .. } => {
                ProcessErrorKind::MalformedModelOutput
            }
            Self::SchemaValidationFailed { .. } => ProcessErrorKind::ModelSchemaError
        }
    }
}

/// Startup-time configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {names}")]
    MissingVars { names: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::RateLimited {
            retry_after_secs: 30
        };
        assert_eq!(err.to_string(), "Rate limited: retry after 30 seconds");
    }

    #[test]
    fn test_upstream_error_carries_last_cause() {
        let err = ProcessError::UpstreamCallFailed {
            attempts: 3,
            source: LlmError::Timeout { secs: 60 }
        };
        assert_eq!(err.to_string(), "Upstream LLM call failed after 3 attempts");
        let source = std::error::Error::source(&err).expect("source preserved");
        assert_eq!(source.to_string(), "Timeout after 60 seconds");
    }

    #[test]
    fn test_schema_validation_names_field_path() {
        let err = ProcessError::SchemaValidationFailed {
            field: "medications[0]".to_string(),
            reason: "missing field `name`".to_string()
        };
        assert!(err.to_string().contains("medications[0]"));
    }

    #[test]
    fn test_process_error_kinds() {
        assert_eq!(
            ProcessError::NoJsonFound.kind(),
            ProcessErrorKind::MalformedModelOutput
        );
        assert_eq!(
            ProcessError::MalformedJson {
                reason: "eof".to_string()
            }
            .kind(),
            ProcessErrorKind::MalformedModelOutput
        );
    }

    #[test]
    fn test_error_kind_serializes_screaming_snake() {
        let code = serde_json::to_string(&ProcessErrorKind::UpstreamError).unwrap();
        assert_eq!(code, "\"UPSTREAM_ERROR\"");
    }
}
