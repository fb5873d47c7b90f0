//! Scripted backend for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::traits::*;

/// Mock LLM backend.
///
/// Replies are taken from a script in order; once the script runs out every
/// call returns the default response. Every request is recorded.
pub struct MockBackend {
    model_id: String,
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    response_content: String,
    requests: Mutex<Vec<CompletionRequest>>,
    call_count: AtomicU32,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockBackend {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            script: Mutex::new(VecDeque::new()),
            response_content: "{}".to_string(),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Reply used once the script is exhausted.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.response_content = content.into();
        self
    }

    /// Queue one successful reply.
    pub fn then_reply(self, content: impl Into<String>) -> Self {
        locked(&self.script).push_back(Ok(content.into()));
        self
    }

    /// Queue one failure.
    pub fn then_fail(self, error: LlmError) -> Self {
        locked(&self.script).push_back(Err(error));
        self
    }

    /// Number of times `complete` was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        locked(&self.requests).clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let prompt_tokens: u32 = request
            .messages
            .iter()
            .map(|m| m.content.len() as u32 / 4)
            .sum();
        locked(&self.requests).push(request);

        let content = match locked(&self.script).pop_front() {
            Some(reply) => reply?,
            None => self.response_content.clone(),
        };
        let completion_tokens = content.len() as u32 / 4;

        Ok(CompletionResponse {
            content,
            finish_reason: FinishReason::Stop,
            usage: Usage {
                prompt_tokens,
                completion_tokens,
            },
        })
    }
}
