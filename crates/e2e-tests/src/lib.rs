//! End-to-end test infrastructure for topic drift.
//!
//! Provides a shared TestHarness wiring the real pipeline to an in-memory
//! store, a mock LLM and a channel sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use drift_detect::DriftDetector;
use drift_llm::{LlmClient, MockLlmClient, TitleSuggester};
use drift_types::{
    Message, MessageId, RawTopicTitleEvent, RealmId, RecipientId, Settings, Stream, StreamId,
    TopicTitleEvent, UserId,
};
use drift_worker::{ChannelSink, InMemoryStore, Notification, SuggestionPipeline};

pub const REALM_ID: RealmId = 1;
pub const STREAM_ID: StreamId = 5;
pub const RECIPIENT_ID: RecipientId = 10;

/// Shared test harness for E2E tests.
pub struct TestHarness {
    pub store: Arc<InMemoryStore>,
    pub llm: Arc<MockLlmClient>,
    pub pipeline: Arc<SuggestionPipeline>,
    pub notifications: UnboundedReceiver<Notification>,
    pub settings: Settings,
    next_id: AtomicU64,
}

impl TestHarness {
    /// Harness whose LLM answers every request with `reply`.
    pub fn new(reply: &str) -> Self {
        Self::with_mock(MockLlmClient::new(reply), Settings::default())
    }

    /// Harness around a configured mock and settings.
    pub fn with_mock(llm: MockLlmClient, settings: Settings) -> Self {
        let store = Arc::new(InMemoryStore::new());
        store.insert_stream(Stream {
            id: STREAM_ID,
            realm_id: REALM_ID,
            recipient_id: RECIPIENT_ID,
            name: "general".to_string(),
        });

        let llm = Arc::new(llm);
        let (sink, notifications) = ChannelSink::new();
        let pipeline = Arc::new(build_pipeline(
            &settings,
            store.clone(),
            Arc::new(sink),
            llm.clone(),
        ));

        Self {
            store,
            llm,
            pipeline,
            notifications,
            settings,
            next_id: AtomicU64::new(1),
        }
    }

    /// Store a message from `sender_id` in `topic` and return it.
    pub fn send(&self, topic: &str, sender_id: UserId, content: &str) -> Message {
        let message = Message {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            realm_id: REALM_ID,
            sender_id,
            recipient_id: RECIPIENT_ID,
            topic_name: topic.to_string(),
            content: content.to_string(),
        };
        self.store.insert_message(message.clone());
        message
    }

    /// Store a run of messages in `topic` from one sender.
    pub fn seed_topic(&self, topic: &str, sender_id: UserId, contents: &[&str]) -> Vec<Message> {
        contents
            .iter()
            .map(|content| self.send(topic, sender_id, content))
            .collect()
    }

    /// Process a message through the pipeline as the send path would.
    pub async fn process(&self, message: &Message) -> drift_worker::PipelineOutcome {
        self.pipeline.process(&event_for(message)).await
    }

    /// Notifications delivered so far.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        let mut delivered = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            delivered.push(notification);
        }
        delivered
    }
}

/// Pipeline over `store` and `sink` using `client` and `settings`.
pub fn build_pipeline(
    settings: &Settings,
    store: Arc<InMemoryStore>,
    sink: Arc<ChannelSink>,
    client: Arc<dyn LlmClient>,
) -> SuggestionPipeline {
    SuggestionPipeline::new(
        store,
        sink,
        DriftDetector::new(settings.drift.clone()),
        TitleSuggester::new(client, &settings.llm.model, settings.suggestion.clone()),
    )
}

/// The event emitted when `message` was sent.
pub fn event_for(message: &Message) -> RawTopicTitleEvent {
    TopicTitleEvent::for_message(message, STREAM_ID).into_raw()
}

/// Event with only a message id set.
pub fn partial_event(message_id: MessageId) -> RawTopicTitleEvent {
    RawTopicTitleEvent {
        message_id: Some(message_id),
        ..Default::default()
    }
}
