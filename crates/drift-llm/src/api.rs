//! API-based LLM client using OpenAI-compatible chat completion endpoints.

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::{CompletionRequest, LlmClient};
use crate::error::LlmError;

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiLlmConfig {
    /// API base URL (e.g., "https://api.groq.com/openai/v1")
    pub base_url: String,

    /// API key
    pub api_key: SecretString,

    /// TCP connect timeout; the overall request is bounded per call
    pub connect_timeout: Duration,

    /// Attempts per completion (1 = no retry)
    pub max_retries: u32,
}

impl ApiLlmConfig {
    /// Create config for an OpenAI-compatible endpoint.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: SecretString::from(api_key.into()),
            connect_timeout: Duration::from_secs(2),
            max_retries: 1,
        }
    }

    /// Create config for Groq.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new("https://api.groq.com/openai/v1", api_key)
    }

    /// Create config for OpenAI.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("https://api.openai.com/v1", api_key)
    }

    /// Set the number of attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }
}

/// OpenAI-compatible LLM client.
pub struct ApiLlmClient {
    client: Client,
    config: ApiLlmConfig,
}

impl ApiLlmClient {
    /// Create a new API client.
    pub fn new(config: ApiLlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Call the API, retrying transient failures within the request timeout.
    async fn call_api(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(request.timeout),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, model = %request.model, "Calling completion API");

            match self.make_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if attempts >= self.config.max_retries || !is_retryable(&e) {
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Completion call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => return Err(e),
                    }
                }
            }
        }
    }

    /// Make a single chat completion request.
    async fn make_request(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            max_tokens: u32,
        }

        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'static str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            #[serde(default)]
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessageResponse,
        }

        #[derive(Deserialize)]
        struct ChatMessageResponse {
            #[serde(default)]
            content: Option<String>,
        }

        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_output_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(request.timeout)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == 429 {
            return Err(LlmError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let response_body: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::ParseError(e.to_string())
            }
        })?;

        response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::ApiError(e.to_string())
    }
}

fn is_retryable(e: &LlmError) -> bool {
    matches!(e, LlmError::RateLimitExceeded | LlmError::ApiError(_))
}

#[async_trait]
impl LlmClient for ApiLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.call_api(request).await
    }
}
