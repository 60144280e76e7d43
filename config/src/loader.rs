//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles.
//!
//! ## Environment Variables
//! - `APP_ENV`: deployment environment (development/production, default
//!   development)
//! - `HOST`: server bind host (default "0.0.0.0")
//! - `PORT`: server bind port (default 8080)
//! - `AZURE_OPENAI_API_KEY`: API key credential
//! - `AZURE_OPENAI_ENDPOINT`: resource endpoint URL
//! - `AZURE_OPENAI_API_VERSION`: API version (default "2023-05-15")
//! - `AZURE_OPENAI_DEPLOYMENT_SUMMARY`: deployment for summary generation
//! - `AZURE_OPENAI_DEPLOYMENT_EXTRACTION`: deployment for entity extraction

use std::env;
use std::str::FromStr;

use errors::ConfigError;
use validator::Validate;

use crate::config::{AzureOpenAiConfig, Config, Environment, ServiceConfig};

/// Load configuration from environment variables.
///
/// Absent credentials are tolerated here; [`verify_at_startup`] decides
/// whether that is fatal for the current environment.
pub fn load_from_env() -> Result<Config, ConfigError> {
    let environment = match env::var("APP_ENV") {
        Ok(value) => Environment::from_str(&value).map_err(|_| ConfigError::Invalid {
            message: format!("APP_ENV must be development or production, got {value:?}")
        })?,
        Err(_) => Environment::default()
    };

    let config = Config {
        environment,
        service: ServiceConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080)
        },
        azure: AzureOpenAiConfig {
            api_key: non_empty(env::var("AZURE_OPENAI_API_KEY").ok()),
            endpoint: non_empty(env::var("AZURE_OPENAI_ENDPOINT").ok()),
            api_version: env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| "2023-05-15".to_string()),
            summary_deployment: non_empty(env::var("AZURE_OPENAI_DEPLOYMENT_SUMMARY").ok()),
            extraction_deployment: non_empty(env::var("AZURE_OPENAI_DEPLOYMENT_EXTRACTION").ok())
        }
    };

    config.validate().map_err(|e| ConfigError::Invalid {
        message: e.to_string()
    })?;

    Ok(config)
}

/// Enforce the startup policy for missing critical settings.
///
/// Production fails fast; development logs a warning and continues, with
/// outbound calls failing `NotConfigured` until the settings appear.
pub fn verify_at_startup(config: &Config) -> Result<(), ConfigError> {
    let missing = config.missing_critical();
    if missing.is_empty() {
        return Ok(());
    }

    if config.environment.is_development() {
        tracing::warn!(
            missing = missing.join(", "),
            "Running in development with missing settings; LLM calls will fail"
        );
        return Ok(());
    }

    Err(ConfigError::MissingVars {
        names: missing.join(", ")
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
