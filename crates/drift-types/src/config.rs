//! Configuration loading for topic drift.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/topic-drift/config.toml.

use config::{Config, Environment, File, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::DriftError;

/// Thresholds for the local drift heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Jaccard similarity below which a text is off-topic for the title.
    #[serde(default = "default_min_similarity_threshold")]
    pub min_similarity_threshold: f64,

    /// Off-topic texts (window plus new message) needed to flag drift.
    #[serde(default = "default_min_off_topic_messages")]
    pub min_off_topic_messages: usize,
}

fn default_min_similarity_threshold() -> f64 {
    0.15
}

fn default_min_off_topic_messages() -> usize {
    2
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            min_similarity_threshold: default_min_similarity_threshold(),
            min_off_topic_messages: default_min_off_topic_messages(),
        }
    }
}

impl DriftConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_similarity_threshold) {
            return Err(format!(
                "min_similarity_threshold must be 0.0-1.0, got {}",
                self.min_similarity_threshold
            ));
        }
        if self.min_off_topic_messages == 0 {
            return Err("min_off_topic_messages must be > 0".to_string());
        }
        Ok(())
    }
}

/// Settings for the title suggestion phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Recent topic messages fetched for evaluation (trigger excluded).
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Messages included in the LLM prompt (newest kept).
    #[serde(default = "default_max_prompt_messages")]
    pub max_prompt_messages: usize,

    /// Per-message character cap inside the prompt.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Longest acceptable sanitized title.
    #[serde(default = "default_max_title_chars")]
    pub max_title_chars: usize,

    /// Hard ceiling on the LLM call (ms).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Response length cap passed to the model.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_window_size() -> usize {
    8
}
fn default_max_prompt_messages() -> usize {
    10
}
fn default_max_message_chars() -> usize {
    500
}
fn default_max_title_chars() -> usize {
    200
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_max_output_tokens() -> u32 {
    50
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            max_prompt_messages: default_max_prompt_messages(),
            max_message_chars: default_max_message_chars(),
            max_title_chars: default_max_title_chars(),
            timeout_ms: default_timeout_ms(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl SuggestionConfig {
    /// LLM timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be > 0".to_string());
        }
        if self.max_prompt_messages == 0 {
            return Err("max_prompt_messages must be > 0".to_string());
        }
        if self.max_title_chars == 0 {
            return Err("max_title_chars must be > 0".to_string());
        }
        Ok(())
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider name, informational only (e.g. "groq", "openai")
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key (prefer the environment over the config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is unset
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Attempts per suggestion, bounded by the suggestion timeout
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_llm_provider() -> String {
    "groq".to_string()
}
fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_llm_model() -> String {
    "llama-3.1-8b-instant".to_string()
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}
fn default_max_retries() -> u32 {
    1
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            max_retries: default_max_retries(),
        }
    }
}

impl LlmSettings {
    /// API key from settings, falling back to `api_key_env`. Blank keys count as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Concurrent workers, each handling one event at a time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Bounded queue capacity; events beyond it are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_concurrency() -> usize {
    4
}
fn default_queue_capacity() -> usize {
    1024
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl WorkerSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be > 0".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be > 0".to_string());
        }
        Ok(())
    }
}

/// Main application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Drift heuristic thresholds
    #[serde(default)]
    pub drift: DriftConfig,

    /// Suggestion phase settings
    #[serde(default)]
    pub suggestion: SuggestionConfig,

    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Worker pool settings
    #[serde(default)]
    pub worker: WorkerSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            drift: DriftConfig::default(),
            suggestion: SuggestionConfig::default(),
            llm: LlmSettings::default(),
            worker: WorkerSettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/topic-drift/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (DRIFT_*, `__` between nested keys)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, DriftError> {
        Self::load_with_env(cli_config_path, None)
    }

    /// `load` with the environment layer read from `env` instead of the
    /// process environment when given.
    fn load_with_env(
        cli_config_path: Option<&str>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, DriftError> {
        let config_dir = ProjectDirs::from("", "", "topic-drift")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| DriftError::Config(e.to_string()))?
            .set_default("llm.provider", default_llm_provider())
            .map_err(|e| DriftError::Config(e.to_string()))?
            .set_default("llm.model", default_llm_model())
            .map_err(|e| DriftError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // e.g. DRIFT_LOG_LEVEL, DRIFT_DRIFT__MIN_OFF_TOPIC_MESSAGES, DRIFT_LLM__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("DRIFT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder
            .build()
            .map_err(|e| DriftError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| DriftError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), DriftError> {
        self.drift.validate().map_err(DriftError::Config)?;
        self.suggestion.validate().map_err(DriftError::Config)?;
        self.worker.validate().map_err(DriftError::Config)?;
        Ok(())
    }

    /// Copy of the settings safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.llm.api_key.is_some() {
            copy.llm.api_key = Some("********".to_string());
        }
        copy
    }
}
