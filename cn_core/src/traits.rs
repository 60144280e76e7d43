use async_trait::async_trait;
use errors::LlmError;

use crate::types::{ChatReply, ChatRequest};

/// Outbound chat-completion transport.
///
/// One call issues exactly one request to the provider; retry policy lives
/// above this seam so implementations stay trivially mockable.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, LlmError>;
}
