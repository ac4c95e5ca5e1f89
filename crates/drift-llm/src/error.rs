//! LLM error types.

use thiserror::Error;

/// Errors from an LLM completion.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Timeout waiting for response")]
    Timeout,

    #[error("No API key configured")]
    MissingCredentials,

    #[error("Model returned no content")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(LlmError::Timeout.to_string().contains("Timeout"));
        assert!(LlmError::MissingCredentials.to_string().contains("API key"));
        assert!(LlmError::ApiError("HTTP 500".to_string())
            .to_string()
            .contains("HTTP 500"));
    }
}
