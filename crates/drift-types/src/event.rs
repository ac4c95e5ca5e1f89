//! Event and message types for topic drift evaluation.
//!
//! The message-send path enqueues a `RawTopicTitleEvent`; workers validate it
//! into a `TopicTitleEvent` before touching the message store. A suggestion is
//! reported back as a `TopicTitleSuggestion` notification.

use serde::{Deserialize, Serialize};

use crate::error::DriftError;

/// Message identifier in the host store.
pub type MessageId = u64;
/// Stream (channel) identifier.
pub type StreamId = u64;
/// Realm (tenant) identifier.
pub type RealmId = u64;
/// Recipient row identifier a stream's messages are addressed to.
pub type RecipientId = u64;
/// User identifier.
pub type UserId = u64;

/// Event type tag carried by suggestion notifications.
pub const SUGGESTION_EVENT_TYPE: &str = "topic_title_suggestion";

/// A stored message, as returned by the context store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub realm_id: RealmId,
    pub sender_id: UserId,
    /// Recipient of the stream the message was sent to
    pub recipient_id: RecipientId,
    pub topic_name: String,
    pub content: String,
}

/// A stream (channel) within a realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub id: StreamId,
    pub realm_id: RealmId,
    pub recipient_id: RecipientId,
    #[serde(default)]
    pub name: String,
}

/// Wire form of the "message sent" event as it arrives from the queue.
///
/// Every field is optional because the queue carries untrusted JSON; use
/// [`RawTopicTitleEvent::validate`] before processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTopicTitleEvent {
    #[serde(default)]
    pub message_id: Option<MessageId>,
    #[serde(default)]
    pub stream_id: Option<StreamId>,
    #[serde(default)]
    pub realm_id: Option<RealmId>,
    #[serde(default)]
    pub topic_name: Option<String>,
    /// Message content captured when the event was emitted
    #[serde(default)]
    pub message_content: Option<String>,
}

impl RawTopicTitleEvent {
    /// Validate required identifying fields.
    ///
    /// Zero ids and an empty topic name count as missing. The captured
    /// content is not required: an absent value simply never matches the
    /// current message content later on.
    pub fn validate(&self) -> Result<TopicTitleEvent, DriftError> {
        let mut missing = Vec::new();

        let message_id = self.message_id.filter(|id| *id != 0);
        if message_id.is_none() {
            missing.push("message_id");
        }
        let stream_id = self.stream_id.filter(|id| *id != 0);
        if stream_id.is_none() {
            missing.push("stream_id");
        }
        let realm_id = self.realm_id.filter(|id| *id != 0);
        if realm_id.is_none() {
            missing.push("realm_id");
        }
        let topic_name = self.topic_name.clone().filter(|t| !t.is_empty());
        if topic_name.is_none() {
            missing.push("topic_name");
        }

        match (message_id, stream_id, realm_id, topic_name) {
            (Some(message_id), Some(stream_id), Some(realm_id), Some(topic_name)) => {
                Ok(TopicTitleEvent {
                    message_id,
                    stream_id,
                    realm_id,
                    topic_name,
                    message_content: self.message_content.clone(),
                })
            }
            _ => Err(DriftError::InvalidInput(format!(
                "missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }

    /// Parse a single JSON event.
    pub fn from_json(json: &str) -> Result<Self, DriftError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A validated "message sent" event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTitleEvent {
    pub message_id: MessageId,
    pub stream_id: StreamId,
    pub realm_id: RealmId,
    pub topic_name: String,
    pub message_content: Option<String>,
}

impl TopicTitleEvent {
    /// Build an event for a message that was just sent.
    pub fn for_message(message: &Message, stream_id: StreamId) -> Self {
        Self {
            message_id: message.id,
            stream_id,
            realm_id: message.realm_id,
            topic_name: message.topic_name.clone(),
            message_content: Some(message.content.clone()),
        }
    }

    /// Whether the content captured at emission time still matches `current`.
    pub fn content_matches(&self, current: &str) -> bool {
        self.message_content.as_deref() == Some(current)
    }

    /// Convert back to the wire form.
    pub fn into_raw(self) -> RawTopicTitleEvent {
        RawTopicTitleEvent {
            message_id: Some(self.message_id),
            stream_id: Some(self.stream_id),
            realm_id: Some(self.realm_id),
            topic_name: Some(self.topic_name),
            message_content: self.message_content,
        }
    }
}

/// Notification sent to a message's author when a better title is proposed.
///
/// Serializes as `{"type": "topic_title_suggestion", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "topic_title_suggestion")]
pub struct TopicTitleSuggestion {
    pub message_id: MessageId,
    pub stream_id: StreamId,
    pub current_topic: String,
    pub suggested_topic: String,
}

impl TopicTitleSuggestion {
    /// Create a suggestion payload for a validated event.
    pub fn new(event: &TopicTitleEvent, suggested_topic: impl Into<String>) -> Self {
        Self {
            message_id: event.message_id,
            stream_id: event.stream_id,
            current_topic: event.topic_name.clone(),
            suggested_topic: suggested_topic.into(),
        }
    }
}
