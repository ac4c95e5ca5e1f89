//! Mock LLM client for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::client::{CompletionRequest, LlmClient};
use crate::error::LlmError;

/// Mock client with a canned reply, an optional delay, and a request log.
///
/// Useful for testing without making API calls.
pub struct MockLlmClient {
    reply: Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    /// Client that answers every request with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            reply: Ok(response.into()),
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Client that fails every request with an API error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            ..Self::new("")
        }
    }

    /// Sleep before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `complete` calls made, including ones that were cancelled.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Prompt of the most recent request.
    pub fn last_prompt(&self) -> Option<String> {
        self.requests().last().map(|r| r.prompt.clone())
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.reply.clone().map_err(LlmError::ApiError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            prompt: "hello".to_string(),
            model: "mock".to_string(),
            timeout: Duration::from_secs(1),
            max_output_tokens: 10,
        }
    }

    #[tokio::test]
    async fn test_mock_replies_and_counts() {
        let mock = MockLlmClient::new("Pizza Planning");
        assert_eq!(mock.complete(&request()).await.unwrap(), "Pizza Planning");
        assert_eq!(mock.complete(&request()).await.unwrap(), "Pizza Planning");
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.last_prompt().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let mock = MockLlmClient::failing("down");
        let result = mock.complete(&request()).await;
        assert!(matches!(result, Err(LlmError::ApiError(ref m)) if m == "down"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_delay() {
        let mock = MockLlmClient::new("late").with_delay(Duration::from_secs(30));
        let started = tokio::time::Instant::now();
        assert_eq!(mock.complete(&request()).await.unwrap(), "late");
        assert!(started.elapsed() >= Duration::from_secs(30));
    }
}
