//! LLM client trait and the disabled fallback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use drift_types::LlmSettings;

use crate::api::{ApiLlmClient, ApiLlmConfig};
use crate::error::LlmError;

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    /// Upper bound the implementation should honour on its own
    pub timeout: Duration,
    pub max_output_tokens: u32,
}

/// Trait for LLM completion.
///
/// Implementations handle transport, auth and retries. Callers still wrap
/// the call in their own timeout, so an implementation that overruns is
/// cancelled rather than waited on.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the request.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Client used when no credentials are configured.
///
/// Always fails with [`LlmError::MissingCredentials`].
pub struct DisabledLlmClient;

#[async_trait]
impl LlmClient for DisabledLlmClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
        Err(LlmError::MissingCredentials)
    }
}

/// Build the client described by `settings`.
///
/// Without an API key this returns a [`DisabledLlmClient`] so the pipeline
/// keeps running and simply produces no suggestions.
pub fn build_llm_client(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, LlmError> {
    match settings.resolved_api_key() {
        Some(api_key) => {
            let config = ApiLlmConfig::new(&settings.base_url, api_key)
                .with_max_retries(settings.max_retries);
            Ok(Arc::new(ApiLlmClient::new(config)?))
        }
        None => {
            warn!(
                provider = %settings.provider,
                api_key_env = %settings.api_key_env,
                "No LLM API key configured, title suggestions disabled"
            );
            Ok(Arc::new(DisabledLlmClient))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            prompt: "Topic title:".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            timeout: Duration::from_secs(5),
            max_output_tokens: 50,
        }
    }

    #[tokio::test]
    async fn test_disabled_client_fails() {
        let result = DisabledLlmClient.complete(&request()).await;
        assert!(matches!(result, Err(LlmError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_build_without_key_is_disabled() {
        let settings = LlmSettings {
            api_key: None,
            api_key_env: "TOPIC_DRIFT_TEST_NO_SUCH_KEY".to_string(),
            ..Default::default()
        };
        let client = build_llm_client(&settings).unwrap();
        let result = client.complete(&request()).await;
        assert!(matches!(result, Err(LlmError::MissingCredentials)));
    }

    #[test]
    fn test_build_with_key() {
        let settings = LlmSettings {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        assert!(build_llm_client(&settings).is_ok());
    }
}
