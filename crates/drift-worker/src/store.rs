//! Message context store seam and an in-memory implementation.
//!
//! The host application owns message persistence; the pipeline only needs
//! three reads. Implementations backed by a database should serve them from
//! one consistent snapshot (e.g. a repeatable-read transaction).

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use drift_types::{Message, MessageId, RealmId, RecipientId, Stream, StreamId};

use crate::error::StoreError;

/// Read access to messages and streams.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Fetch a message by id; `None` if it no longer exists.
    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, StoreError>;

    /// Fetch a stream within a realm; `None` if it no longer exists.
    async fn get_stream(&self, id: StreamId, realm_id: RealmId)
        -> Result<Option<Stream>, StoreError>;

    /// Contents of the most recent messages in a topic, newest first.
    ///
    /// `exclude_id` is left out of the result. Topic names compare
    /// case-insensitively.
    async fn list_recent_topic_messages(
        &self,
        realm_id: RealmId,
        recipient_id: RecipientId,
        topic_name: &str,
        exclude_id: MessageId,
        limit: usize,
    ) -> Result<Vec<String>, StoreError>;
}

/// Serialized store contents, as used by replay fixtures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFixture {
    #[serde(default)]
    pub streams: Vec<Stream>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Default)]
struct StoreState {
    messages: BTreeMap<MessageId, Message>,
    streams: HashMap<StreamId, Stream>,
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from fixture contents.
    pub fn from_fixture(fixture: StoreFixture) -> Self {
        let store = Self::new();
        for stream in fixture.streams {
            store.insert_stream(stream);
        }
        for message in fixture.messages {
            store.insert_message(message);
        }
        store
    }

    /// Load a JSON fixture file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let bytes = std::fs::read(path)?;
        let fixture: StoreFixture = serde_json::from_slice(&bytes)?;
        Ok(Self::from_fixture(fixture))
    }

    /// Insert or replace a stream.
    pub fn insert_stream(&self, stream: Stream) {
        if let Ok(mut state) = self.state.write() {
            state.streams.insert(stream.id, stream);
        }
    }

    /// Insert or replace a message.
    pub fn insert_message(&self, message: Message) {
        if let Ok(mut state) = self.state.write() {
            state.messages.insert(message.id, message);
        }
    }

    /// Replace a message's content. Returns false if the message is unknown.
    pub fn edit_message(&self, id: MessageId, content: impl Into<String>) -> bool {
        match self.state.write() {
            Ok(mut state) => match state.messages.get_mut(&id) {
                Some(message) => {
                    message.content = content.into();
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Remove a message. Returns false if the message is unknown.
    pub fn delete_message(&self, id: MessageId) -> bool {
        self.state
            .write()
            .map(|mut state| state.messages.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Remove a stream. Returns false if the stream is unknown.
    pub fn delete_stream(&self, id: StreamId) -> bool {
        self.state
            .write()
            .map(|mut state| state.streams.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Number of stored messages.
    pub fn message_count(&self) -> usize {
        self.state.read().map(|s| s.messages.len()).unwrap_or(0)
    }

    fn read_state(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ContextStore for InMemoryStore {
    async fn get_message(&self, id: MessageId) -> Result<Option<Message>, StoreError> {
        Ok(self.read_state()?.messages.get(&id).cloned())
    }

    async fn get_stream(
        &self,
        id: StreamId,
        realm_id: RealmId,
    ) -> Result<Option<Stream>, StoreError> {
        Ok(self
            .read_state()?
            .streams
            .get(&id)
            .filter(|s| s.realm_id == realm_id)
            .cloned())
    }

    async fn list_recent_topic_messages(
        &self,
        realm_id: RealmId,
        recipient_id: RecipientId,
        topic_name: &str,
        exclude_id: MessageId,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let topic = topic_name.to_lowercase();
        let state = self.read_state()?;

        Ok(state
            .messages
            .values()
            .rev()
            .filter(|m| {
                m.id != exclude_id
                    && m.realm_id == realm_id
                    && m.recipient_id == recipient_id
                    && m.topic_name.to_lowercase() == topic
            })
            .take(limit)
            .map(|m| m.content.clone())
            .collect())
    }
}
