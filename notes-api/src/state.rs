//! Application state wiring for the clinical notes service.

use std::sync::Arc;

use cn_core::ChatClient;
use config::Config;
use llm::{AzureOpenAiClient, ResilientLlmClient, TaskProfiles};
use processor::NoteProcessor;

use crate::error::{ApiError, Result};

/// Shared, read-only application state.
///
/// Built once at startup; safe to share across concurrent requests since
/// nothing in it is mutated per request.
pub struct AppState {
    pub config: Config,
    pub processor: NoteProcessor
}

impl AppState {
    /// Wire the real Azure OpenAI transport from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let transport =
            AzureOpenAiClient::new(config.azure.clone()).map_err(|e| ApiError::Server(e.to_string()))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Wire an injected transport; used by tests.
    pub fn with_transport(config: Config, transport: Arc<dyn ChatClient>) -> Self {
        let client = ResilientLlmClient::new(transport, TaskProfiles::from_config(&config.azure));
        Self::with_processor(config, NoteProcessor::new(client))
    }

    /// Use a fully prepared processor; used by tests that tune retry policy.
    pub fn with_processor(config: Config, processor: NoteProcessor) -> Self {
        Self { config, processor }
    }
}
