//! Configuration structures for the clinical notes service.
//!
//! All structures use `serde` for deserialization and `validator` for shape
//! validation. Credential fields are optional so a development process can
//! boot without them; [`Config::missing_critical`] reports what is absent
//! and the startup path decides whether that is fatal.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

/// Deployment environment the process runs in.
///
/// Development tolerates missing provider credentials (calls fail later with
/// `NotConfigured`); every other environment fails fast at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Development,
    Production
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ServiceConfig {
    /// Host to bind the server to.
    #[validate(length(min = 1, max = 255))]
    pub host: String,

    /// Port to bind the server to.
    #[validate(range(min = 1, max = 65535))]
    pub port: u16
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080
        }
    }
}

/// Azure OpenAI connection settings.
///
/// Two deployments are configured, one per task: summary generation and
/// entity extraction.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct AzureOpenAiConfig {
    /// API key credential.
    pub api_key: Option<String>,

    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    #[validate(url)]
    pub endpoint: Option<String>,

    /// API version string sent on every request.
    #[validate(length(min = 1))]
    pub api_version: String,

    /// Deployment identifier serving the summarize task.
    pub summary_deployment: Option<String>,

    /// Deployment identifier serving the extract task.
    pub extraction_deployment: Option<String>
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            api_version: default_api_version(),
            summary_deployment: None,
            extraction_deployment: None
        }
    }
}

fn default_api_version() -> String {
    "2023-05-15".to_string()
}

/// Top-level configuration for the clinical notes service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    #[validate(nested)]
    pub service: ServiceConfig,

    #[serde(default)]
    #[validate(nested)]
    pub azure: AzureOpenAiConfig
}

impl Config {
    /// Names of required settings that are absent.
    ///
    /// Empty means the outbound LLM client is fully configured.
    pub fn missing_critical(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.azure.api_key.is_none() {
            missing.push("AZURE_OPENAI_API_KEY");
        }
        if self.azure.endpoint.is_none() {
            missing.push("AZURE_OPENAI_ENDPOINT");
        }
        if self.azure.summary_deployment.is_none() {
            missing.push("AZURE_OPENAI_DEPLOYMENT_SUMMARY");
        }
        if self.azure.extraction_deployment.is_none() {
            missing.push("AZURE_OPENAI_DEPLOYMENT_EXTRACTION");
        }
        missing
    }
}
