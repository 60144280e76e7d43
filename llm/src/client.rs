//! Retry envelope and per-task call profiles for the LLM transport.

use std::sync::Arc;
use std::time::Duration;

use cn_core::types::{ChatRequest, TaskKind};
use cn_core::ChatClient;
use config::AzureOpenAiConfig;
use errors::{LlmError, ProcessError};
use tokio_retry::strategy::ExponentialBackoff;

use crate::prompts;

/// Bounded retry policy for one logical LLM call.
///
/// All transport errors are retried uniformly; the policy does not try to
/// classify transient vs. permanent failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay.
    pub max_delay_ms: u64
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 2000,
            max_delay_ms: 10_000
        }
    }
}

impl RetryPolicy {
    /// Backoff delays between attempts: initial, doubling, capped.
    fn backoff(&self) -> impl Iterator<Item = Duration> {
        // Scale by the full initial delay and halve afterwards so odd
        // millisecond values survive intact.
        let max_delay = Duration::from_millis(self.max_delay_ms);
        ExponentialBackoff::from_millis(2)
            .factor(self.initial_delay_ms)
            .map(move |delay| (delay / 2).min(max_delay))
    }
}

/// Call configuration for one task kind: which deployment serves it and how
/// the sampling is tuned.
#[derive(Debug, Clone)]
pub struct TaskProfile {
    pub task: TaskKind,
    pub deployment: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32
}

impl TaskProfile {
    fn chat_request(&self, clinical_note: &str) -> Result<ChatRequest, LlmError> {
        let deployment = self
            .deployment
            .clone()
            .ok_or_else(|| LlmError::NotConfigured {
                missing: format!("deployment for {} task", self.task)
            })?;

        Ok(ChatRequest {
            task: self.task,
            deployment,
            system: prompts::system_for(self.task).to_string(),
            user: prompts::user_for(self.task, clinical_note),
            temperature: self.temperature,
            max_tokens: self.max_tokens
        })
    }
}

/// The per-task configuration table.
///
/// Summarize runs warmer with a short cap; Extract runs near-deterministic
/// with room for the full JSON payload.
#[derive(Debug, Clone)]
pub struct TaskProfiles {
    summarize: TaskProfile,
    extract: TaskProfile
}

impl TaskProfiles {
    pub fn from_config(azure: &AzureOpenAiConfig) -> Self {
        Self {
            summarize: TaskProfile {
                task: TaskKind::Summarize,
                deployment: azure.summary_deployment.clone(),
                temperature: 0.3,
                max_tokens: 500
            },
            extract: TaskProfile {
                task: TaskKind::Extract,
                deployment: azure.extraction_deployment.clone(),
                temperature: 0.1,
                max_tokens: 1000
            }
        }
    }

    pub fn get(&self, task: TaskKind) -> &TaskProfile {
        match task {
            TaskKind::Summarize => &self.summarize,
            TaskKind::Extract => &self.extract
        }
    }
}

/// LLM client with a bounded retry/backoff envelope around a transport.
pub struct ResilientLlmClient {
    transport: Arc<dyn ChatClient>,
    profiles: TaskProfiles,
    retry: RetryPolicy
}

impl ResilientLlmClient {
    pub fn new(transport: Arc<dyn ChatClient>, profiles: TaskProfiles) -> Self {
        Self {
            transport,
            profiles,
            retry: RetryPolicy::default()
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Issue one task call for a note and return the raw model reply text.
    ///
    /// Retries uniformly on any transport error; after the budget is
    /// exhausted the last error is wrapped in `UpstreamCallFailed`.
    pub async fn call(&self, task: TaskKind, clinical_note: &str) -> Result<String, ProcessError> {
        let request = self.profiles.get(task).chat_request(clinical_note);
        let mut delays = self.retry.backoff();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let started = std::time::Instant::now();

            let result = match &request {
                Ok(request) => self.transport.complete(request).await,
                Err(e) => Err(e.clone())
            };

            match result {
                Ok(reply) => {
                    let latency_ms = started.elapsed().as_millis() as u64;
                    tracing::info!(
                        task = %task,
                        attempt,
                        latency_ms,
                        total_tokens = reply.usage.map(|u| u.total_tokens),
                        reply_chars = reply.content.len(),
                        "LLM call succeeded"
                    );
                    return Ok(reply.content);
                }
                Err(e) => {
                    let latency_ms = started.elapsed().as_millis() as u64;
                    tracing::warn!(
                        task = %task,
                        attempt,
                        latency_ms,
                        error = %e,
                        "LLM call attempt failed"
                    );

                    if attempt >= self.retry.max_attempts {
                        return Err(ProcessError::UpstreamCallFailed {
                            attempts: attempt,
                            source: e
                        });
                    }

                    if let Some(delay) = delays.next() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChatClient;

    fn configured_azure() -> AzureOpenAiConfig {
        AzureOpenAiConfig {
            api_key: Some("key".to_string()),
            endpoint: Some("https://unit.openai.azure.com".to_string()),
            api_version: "2023-05-15".to_string(),
            summary_deployment: Some("gpt-summary".to_string()),
            extraction_deployment: Some("gpt-extract".to_string())
        }
    }

    fn client(mock: &Arc<MockChatClient>) -> ResilientLlmClient {
        ResilientLlmClient::new(mock.clone(), TaskProfiles::from_config(&configured_azure()))
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = policy.backoff().take(4).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(10)
            ]
        );
    }

    #[test]
    fn test_backoff_preserves_odd_and_small_initial_delays() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay_ms: 5,
            max_delay_ms: 12
        };
        let delays: Vec<_> = policy.backoff().take(3).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(5),
                Duration::from_millis(10),
                Duration::from_millis(12)
            ]
        );

        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 10
        };
        let delays: Vec<_> = policy.backoff().take(2).collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(1), Duration::from_millis(2)]
        );
    }

    #[test]
    fn test_profiles_match_task_tuning() {
        let profiles = TaskProfiles::from_config(&configured_azure());
        let summarize = profiles.get(TaskKind::Summarize);
        assert_eq!(summarize.deployment.as_deref(), Some("gpt-summary"));
        assert!((summarize.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(summarize.max_tokens, 500);

        let extract = profiles.get(TaskKind::Extract);
        assert_eq!(extract.deployment.as_deref(), Some("gpt-extract"));
        assert!((extract.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(extract.max_tokens, 1000);
    }

    #[tokio::test]
    async fn test_first_attempt_success_makes_one_call() {
        let mock = Arc::new(MockChatClient::new());
        mock.script_ok(TaskKind::Summarize, "Summary text.");

        let reply = client(&mock)
            .call(TaskKind::Summarize, "Patient stable overnight.")
            .await
            .unwrap();

        assert_eq!(reply, "Summary text.");
        assert_eq!(mock.calls(TaskKind::Summarize), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds_on_third_attempt() {
        let mock = Arc::new(MockChatClient::new());
        mock.script_err(
            TaskKind::Extract,
            LlmError::RequestFailed {
                reason: "connection reset".to_string()
            }
        );
        mock.script_err(TaskKind::Extract, LlmError::RateLimited { retry_after_secs: 1 });
        mock.script_ok(TaskKind::Extract, "{}");

        let started = tokio::time::Instant::now();
        let reply = client(&mock)
            .call(TaskKind::Extract, "Patient stable overnight.")
            .await
            .unwrap();

        assert_eq!(reply, "{}");
        assert_eq!(mock.calls(TaskKind::Extract), 3);
        // Two backoff sleeps: 2s then 4s.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_wraps_last_error_and_stops_at_three() {
        let mock = Arc::new(MockChatClient::new());
        for _ in 0..3 {
            mock.script_err(TaskKind::Extract, LlmError::Timeout { secs: 60 });
        }
        // A fourth scripted success must never be reached.
        mock.script_ok(TaskKind::Extract, "unreachable");

        let err = client(&mock)
            .call(TaskKind::Extract, "Patient stable overnight.")
            .await
            .unwrap_err();

        assert_eq!(mock.calls(TaskKind::Extract), 3);
        match err {
            ProcessError::UpstreamCallFailed { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(source, LlmError::Timeout { secs: 60 }));
            }
            other => panic!("unexpected error: {other:?}")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_deployment_never_reaches_transport() {
        let mut azure = configured_azure();
        azure.summary_deployment = None;
        let mock = Arc::new(MockChatClient::new());
        let client = ResilientLlmClient::new(mock.clone(), TaskProfiles::from_config(&azure));

        let err = client
            .call(TaskKind::Summarize, "Patient stable overnight.")
            .await
            .unwrap_err();

        assert_eq!(mock.calls(TaskKind::Summarize), 0);
        match err {
            ProcessError::UpstreamCallFailed { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(source, LlmError::NotConfigured { .. }));
            }
            other => panic!("unexpected error: {other:?}")
        }
    }

    #[tokio::test]
    async fn test_request_carries_profile_and_prompts() {
        let mock = Arc::new(MockChatClient::new());
        mock.script_ok(TaskKind::Extract, "{}");

        client(&mock)
            .call(TaskKind::Extract, "BP 140/90, started amlodipine.")
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.deployment, "gpt-extract");
        assert_eq!(request.max_tokens, 1000);
        assert!(request.system.contains("structured data"));
        assert!(request.user.contains("BP 140/90"));
    }
}
