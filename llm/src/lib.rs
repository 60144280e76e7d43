//! Resilient LLM client layer.
//!
//! Wraps an Azure OpenAI-style chat-completions endpoint behind the
//! `ChatClient` seam, adds a bounded retry/backoff envelope per call, and
//! recovers structured JSON from prose-contaminated model replies.

pub mod azure;
pub mod client;
pub mod mock;
pub mod normalizer;
pub mod prompts;

pub use azure::AzureOpenAiClient;
pub use client::{ResilientLlmClient, RetryPolicy, TaskProfile, TaskProfiles};
pub use mock::MockChatClient;
pub use normalizer::extract_json;
