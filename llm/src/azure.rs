//! Azure OpenAI chat-completions transport.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use cn_core::types::{ChatReply, ChatRequest, TokenUsage};
use cn_core::ChatClient;
use config::AzureOpenAiConfig;
use errors::LlmError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Reqwest-backed transport against an Azure OpenAI deployment endpoint.
///
/// Holds no per-request mutable state; one instance is shared across all
/// concurrent requests.
pub struct AzureOpenAiClient {
    client: Client,
    config: AzureOpenAiConfig
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str
}

#[derive(Debug, Serialize)]
struct WireChatRequest<'a> {
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32
}

impl<'a> WireChatRequest<'a> {
    fn from_request(request: &'a ChatRequest) -> Self {
        Self {
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.system
                },
                WireMessage {
                    role: "user",
                    content: &request.user
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: 0.95,
            frequency_penalty: 0.0,
            presence_penalty: 0.0
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireChatResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32
}

impl AzureOpenAiClient {
    pub fn new(config: AzureOpenAiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::RequestFailed {
                reason: e.to_string()
            })?;

        Ok(Self { client, config })
    }

    fn credentials(&self) -> Result<(&str, &str), LlmError> {
        let api_key = self.config.api_key.as_deref().ok_or(LlmError::NotConfigured {
            missing: "AZURE_OPENAI_API_KEY".to_string()
        })?;
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or(LlmError::NotConfigured {
                missing: "AZURE_OPENAI_ENDPOINT".to_string()
            })?;
        Ok((api_key, endpoint))
    }

    fn completions_url(&self, endpoint: &str, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            deployment,
            self.config.api_version
        )
    }
}

#[async_trait]
impl ChatClient for AzureOpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, LlmError> {
        let (api_key, endpoint) = self.credentials()?;
        let url = self.completions_url(endpoint, &request.deployment);
        let started = Instant::now();

        let resp = self
            .client
            .post(&url)
            .header("api-key", api_key)
            .json(&WireChatRequest::from_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        secs: REQUEST_TIMEOUT_SECS
                    }
                } else {
                    LlmError::RequestFailed {
                        reason: e.to_string()
                    }
                }
            })?;

        let status = resp.status();
        if status.as_u16() == 429 {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(LlmError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                reason: format!("HTTP {status}: {body}")
            });
        }

        let parsed: WireChatResponse = resp.json().await.map_err(|e| LlmError::InvalidResponse {
            reason: e.to_string()
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse {
                reason: "reply carried no message content".to_string()
            })?;

        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens
        });

        tracing::debug!(
            task = %request.task,
            deployment = %request.deployment,
            latency_ms = started.elapsed().as_millis() as u64,
            total_tokens = usage.map(|u| u.total_tokens),
            "Chat completion returned"
        );

        Ok(ChatReply { content, usage })
    }
}
