//! Scripted `ChatClient` double for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use cn_core::types::{ChatReply, ChatRequest, TaskKind};
use cn_core::ChatClient;
use errors::LlmError;

/// A transport whose replies are scripted per task, in order.
///
/// Every received request is recorded so tests can assert on deployment,
/// sampling parameters, and prompt content.
#[derive(Default)]
pub struct MockChatClient {
    scripts: Mutex<HashMap<TaskKind, VecDeque<Result<String, LlmError>>>>,
    requests: Mutex<Vec<ChatRequest>>
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply for the next call of `task`.
    pub fn script_ok(&self, task: TaskKind, content: &str) {
        self.script(task, Ok(content.to_string()));
    }

    /// Queue a failure for the next call of `task`.
    pub fn script_err(&self, task: TaskKind, error: LlmError) {
        self.script(task, Err(error));
    }

    fn script(&self, task: TaskKind, outcome: Result<String, LlmError>) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts.entry(task).or_default().push_back(outcome);
    }

    /// Number of calls received for `task`.
    pub fn calls(&self, task: TaskKind) -> usize {
        let requests = self.requests.lock().unwrap();
        requests.iter().filter(|r| r.task == task).count()
    }

    /// Every request received, in arrival order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut scripts = self.scripts.lock().unwrap();
        let outcome = scripts
            .get_mut(&request.task)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| {
                Err(LlmError::InvalidResponse {
                    reason: format!("mock script exhausted for {} task", request.task)
                })
            });

        outcome.map(|content| ChatReply {
            content,
            usage: None
        })
    }
}
