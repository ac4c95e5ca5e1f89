//! Per-event suggestion pipeline.
//!
//! Key design principles:
//! - Fetch-then-act: every store read happens before the LLM is called
//! - The LLM is only consulted when the local heuristic flags drift
//! - Never raises: each event ends in a `PipelineOutcome`
//! - Notifications go to the message's sender only

use std::sync::Arc;

use tracing::{debug, info, warn};

use drift_detect::DriftDetector;
use drift_llm::{SuggestionResult, TitleSuggester};
use drift_types::{Message, RawTopicTitleEvent, Stream, TopicTitleEvent, TopicTitleSuggestion};

use crate::metrics::PipelineMetrics;
use crate::sink::NotificationSink;
use crate::store::ContextStore;

/// Terminal state of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Required fields missing; the event was discarded
    InvalidEvent(String),
    /// Message or stream no longer exists
    NotFound,
    /// Message was edited after the event was emitted
    StaleContent,
    /// Topic still matches its title
    NoDrift,
    /// Drift flagged but no usable title came back
    NoSuggestion,
    /// Suggestion delivered to the sender
    Suggested(TopicTitleSuggestion),
    /// Store backend failure
    Failed(String),
}

impl PipelineOutcome {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineOutcome::InvalidEvent(_) => "invalid_event",
            PipelineOutcome::NotFound => "not_found",
            PipelineOutcome::StaleContent => "stale_content",
            PipelineOutcome::NoDrift => "no_drift",
            PipelineOutcome::NoSuggestion => "no_suggestion",
            PipelineOutcome::Suggested(_) => "suggested",
            PipelineOutcome::Failed(_) => "failed",
        }
    }
}

/// Everything read from the store for one event.
#[derive(Debug, Clone)]
pub struct TopicContext {
    pub event: TopicTitleEvent,
    pub message: Message,
    pub stream: Stream,
    /// Other recent messages in the topic, oldest first
    pub recent: Vec<String>,
}

impl TopicContext {
    /// Messages for the title prompt: non-blank window entries followed by
    /// the triggering message.
    pub fn prompt_messages(&self) -> Vec<&str> {
        self.recent
            .iter()
            .map(String::as_str)
            .filter(|m| !m.trim().is_empty())
            .chain(std::iter::once(self.message.content.as_str()))
            .collect()
    }
}

/// Turns "message sent" events into topic title suggestions.
pub struct SuggestionPipeline {
    store: Arc<dyn ContextStore>,
    sink: Arc<dyn NotificationSink>,
    detector: DriftDetector,
    suggester: TitleSuggester,
    metrics: Arc<PipelineMetrics>,
}

impl SuggestionPipeline {
    pub fn new(
        store: Arc<dyn ContextStore>,
        sink: Arc<dyn NotificationSink>,
        detector: DriftDetector,
        suggester: TitleSuggester,
    ) -> Self {
        Self {
            store,
            sink,
            detector,
            suggester,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Get metrics for monitoring.
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        self.metrics.clone()
    }

    /// Process one event to completion.
    pub async fn process(&self, raw: &RawTopicTitleEvent) -> PipelineOutcome {
        PipelineMetrics::incr(&self.metrics.received);
        let outcome = self.run(raw).await;
        self.record(&outcome);
        outcome
    }

    async fn run(&self, raw: &RawTopicTitleEvent) -> PipelineOutcome {
        let event = match raw.validate() {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Discarding invalid topic title event");
                return PipelineOutcome::InvalidEvent(e.to_string());
            }
        };

        let context = match self.load_context(event).await {
            Ok(context) => context,
            Err(outcome) => return outcome,
        };

        let assessment = self.detector.evaluate(
            &context.message.topic_name,
            &context.recent,
            &context.message.content,
        );
        if !assessment.drifted {
            debug!(
                message_id = context.event.message_id,
                reason = ?assessment.reason,
                similarity = assessment.new_message_similarity,
                off_topic = assessment.off_topic_count,
                "No topic drift"
            );
            return PipelineOutcome::NoDrift;
        }

        debug!(
            message_id = context.event.message_id,
            topic = %context.message.topic_name,
            off_topic = assessment.off_topic_count,
            "Topic drift detected, requesting title suggestion"
        );

        let result = self
            .suggester
            .suggest(&context.message.topic_name, &context.prompt_messages())
            .await;
        self.record_llm(&result);

        let Some(title) = result.into_title() else {
            debug!(message_id = context.event.message_id, "No title suggestion");
            return PipelineOutcome::NoSuggestion;
        };

        let suggestion = TopicTitleSuggestion::new(&context.event, title);
        info!(
            message_id = suggestion.message_id,
            stream_id = suggestion.stream_id,
            current = %suggestion.current_topic,
            suggested = %suggestion.suggested_topic,
            "Sending topic title suggestion"
        );
        self.sink
            .notify(
                context.event.realm_id,
                suggestion.clone(),
                &[context.message.sender_id],
            )
            .await;

        PipelineOutcome::Suggested(suggestion)
    }

    /// Read message, stream and window for a validated event.
    async fn load_context(&self, event: TopicTitleEvent) -> Result<TopicContext, PipelineOutcome> {
        let message = match self.store.get_message(event.message_id).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!(message_id = event.message_id, "Message not found, skipping");
                return Err(PipelineOutcome::NotFound);
            }
            Err(e) => return Err(store_failure(&event, e)),
        };

        let stream = match self.store.get_stream(event.stream_id, event.realm_id).await {
            Ok(Some(stream)) => stream,
            Ok(None) => {
                debug!(stream_id = event.stream_id, "Stream not found, skipping");
                return Err(PipelineOutcome::NotFound);
            }
            Err(e) => return Err(store_failure(&event, e)),
        };

        if !event.content_matches(&message.content) {
            debug!(message_id = event.message_id, "Message edited since event, skipping");
            return Err(PipelineOutcome::StaleContent);
        }

        let mut recent = self
            .store
            .list_recent_topic_messages(
                event.realm_id,
                stream.recipient_id,
                &message.topic_name,
                message.id,
                self.suggester.config().window_size,
            )
            .await
            .map_err(|e| store_failure(&event, e))?;
        recent.reverse();

        Ok(TopicContext {
            event,
            message,
            stream,
            recent,
        })
    }

    fn record(&self, outcome: &PipelineOutcome) {
        let counter = match outcome {
            PipelineOutcome::InvalidEvent(_) => &self.metrics.invalid_event,
            PipelineOutcome::NotFound => &self.metrics.not_found,
            PipelineOutcome::StaleContent => &self.metrics.stale_content,
            PipelineOutcome::NoDrift => &self.metrics.no_drift,
            PipelineOutcome::NoSuggestion => &self.metrics.no_suggestion,
            PipelineOutcome::Suggested(_) => &self.metrics.suggested,
            PipelineOutcome::Failed(_) => &self.metrics.failed,
        };
        PipelineMetrics::incr(counter);
    }

    fn record_llm(&self, result: &SuggestionResult) {
        match result {
            SuggestionResult::NoMessages => return,
            SuggestionResult::TimedOut => PipelineMetrics::incr(&self.metrics.llm_timeouts),
            SuggestionResult::Failed(_) | SuggestionResult::Rejected(_) => {
                PipelineMetrics::incr(&self.metrics.llm_failures)
            }
            SuggestionResult::Suggested(_) => {}
        }
        PipelineMetrics::incr(&self.metrics.llm_calls);
    }
}

fn store_failure(event: &TopicTitleEvent, error: crate::error::StoreError) -> PipelineOutcome {
    warn!(message_id = event.message_id, error = %error, "Context store read failed");
    PipelineOutcome::Failed(error.to_string())
}
