//! # drift-llm
//!
//! Title suggestion through an external language model.
//!
//! Only called after the local heuristic flags drift, so every request here
//! is a deliberate, bounded cost:
//! - `LlmClient`: pluggable async completion (HTTP, disabled, mock)
//! - Prompt assembly over the recent topic window
//! - Sanitization of raw model output into a usable title
//! - `TitleSuggester`: timeout-bounded, never-failing orchestration

pub mod api;
pub mod client;
pub mod error;
pub mod mock;
pub mod prompt;
pub mod sanitize;
pub mod suggester;

pub use api::{ApiLlmClient, ApiLlmConfig};
pub use client::{build_llm_client, CompletionRequest, DisabledLlmClient, LlmClient};
pub use error::LlmError;
pub use mock::MockLlmClient;
pub use prompt::{build_title_prompt, truncate_chars};
pub use sanitize::sanitize_title;
pub use suggester::{SuggestionResult, TitleSuggester};
