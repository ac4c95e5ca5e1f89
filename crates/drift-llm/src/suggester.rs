//! Timeout-bounded title suggestion.
//!
//! Key design principles:
//! - Never fails: every problem degrades to "no suggestion"
//! - The LLM future is dropped at the timeout boundary
//! - Empty input never reaches the model

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, warn};

use drift_types::SuggestionConfig;

use crate::client::{CompletionRequest, LlmClient};
use crate::error::LlmError;
use crate::prompt::build_title_prompt;
use crate::sanitize::sanitize_title;

/// Outcome of a suggestion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionResult {
    /// Usable, sanitized title
    Suggested(String),
    /// Nothing to base a suggestion on; the model was not called
    NoMessages,
    /// Client returned an error
    Failed(String),
    /// No answer within the timeout
    TimedOut,
    /// Model output was empty or too long after sanitization
    Rejected(String),
}

impl SuggestionResult {
    /// The suggested title, if any.
    pub fn title(&self) -> Option<&str> {
        match self {
            SuggestionResult::Suggested(title) => Some(title),
            _ => None,
        }
    }

    /// Consume into the suggested title, if any.
    pub fn into_title(self) -> Option<String> {
        match self {
            SuggestionResult::Suggested(title) => Some(title),
            _ => None,
        }
    }
}

/// Suggests replacement titles through an [`LlmClient`].
pub struct TitleSuggester {
    client: Arc<dyn LlmClient>,
    model: String,
    config: SuggestionConfig,
}

impl TitleSuggester {
    /// Create a suggester for `model`.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, config: SuggestionConfig) -> Self {
        Self {
            client,
            model: model.into(),
            config,
        }
    }

    /// Get configuration.
    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    /// Build the completion request for a topic and its messages.
    pub fn request_for<S: AsRef<str>>(&self, topic_name: &str, messages: &[S]) -> CompletionRequest {
        CompletionRequest {
            prompt: build_title_prompt(
                topic_name,
                messages,
                self.config.max_prompt_messages,
                self.config.max_message_chars,
            ),
            model: self.model.clone(),
            timeout: self.config.timeout(),
            max_output_tokens: self.config.max_output_tokens,
        }
    }

    /// Suggest a title for `topic_name` from chronological `messages`.
    pub async fn suggest<S: AsRef<str>>(&self, topic_name: &str, messages: &[S]) -> SuggestionResult {
        if messages.is_empty() {
            return SuggestionResult::NoMessages;
        }

        let request = self.request_for(topic_name, messages);

        match timeout(self.config.timeout(), self.client.complete(&request)).await {
            Ok(Ok(raw)) => match sanitize_title(&raw, self.config.max_title_chars) {
                Some(title) => {
                    debug!(topic = %topic_name, suggested = %title, "Title suggestion received");
                    SuggestionResult::Suggested(title)
                }
                None => {
                    warn!(raw = %raw, "LLM returned an unusable topic title");
                    SuggestionResult::Rejected(raw)
                }
            },
            Ok(Err(LlmError::Timeout)) => {
                warn!(timeout_ms = self.config.timeout_ms, "LLM request timed out");
                SuggestionResult::TimedOut
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to get LLM topic title suggestion");
                SuggestionResult::Failed(e.to_string())
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.config.timeout_ms,
                    "LLM suggestion timed out, abandoning request"
                );
                SuggestionResult::TimedOut
            }
        }
    }
}
