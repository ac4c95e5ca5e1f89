//! # drift-types
//!
//! Shared domain types for the topic drift pipeline.
//!
//! - Events: the inbound "message sent" record and its validated form
//! - Messages and streams as read from the host message store
//! - The `topic_title_suggestion` notification payload
//! - Layered settings for every stage of the pipeline

pub mod config;
pub mod error;
pub mod event;

pub use config::{DriftConfig, LlmSettings, Settings, SuggestionConfig, WorkerSettings};
pub use error::DriftError;
pub use event::{
    Message, MessageId, RawTopicTitleEvent, RealmId, RecipientId, Stream, StreamId,
    TopicTitleEvent, TopicTitleSuggestion, UserId, SUGGESTION_EVENT_TYPE,
};
