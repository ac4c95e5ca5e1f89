//! Topic drift heuristic.
//!
//! A topic is flagged as drifted when the newest message is off-topic for
//! the title and enough recent messages are off-topic as well. An on-topic
//! newest message vetoes drift regardless of history.

use serde::Serialize;

use drift_types::DriftConfig;

use crate::normalize::token_set;
use crate::similarity::jaccard;

/// Why a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftReason {
    /// Untitled topics cannot drift
    BlankTitle,
    /// No window and no new message
    NothingToEvaluate,
    /// Newest message is close enough to the title
    NewMessageOnTopic,
    /// Off-topic texts did not reach the configured minimum
    TooFewOffTopic,
    /// Drift flagged
    OffTopic,
}

/// Outcome of a drift evaluation with the numbers behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftAssessment {
    pub drifted: bool,
    pub reason: DriftReason,
    /// Similarity of the new message to the title (0.0 when not computed)
    pub new_message_similarity: f64,
    /// Off-topic texts counted, new message included
    pub off_topic_count: usize,
}

impl DriftAssessment {
    fn settled(reason: DriftReason, new_message_similarity: f64) -> Self {
        Self {
            drifted: false,
            reason,
            new_message_similarity,
            off_topic_count: 0,
        }
    }
}

/// Drift detector holding its thresholds.
#[derive(Debug, Clone, Default)]
pub struct DriftDetector {
    config: DriftConfig,
}

impl DriftDetector {
    /// Create a detector with the given thresholds.
    pub fn new(config: DriftConfig) -> Self {
        Self { config }
    }

    /// Get configuration.
    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Evaluate `new_message` and the recent window against `topic_title`.
    ///
    /// The new message is counted once as off-topic when it falls through
    /// the veto; window entries that are blank are skipped entirely.
    pub fn evaluate<S: AsRef<str>>(
        &self,
        topic_title: &str,
        recent_messages: &[S],
        new_message: &str,
    ) -> DriftAssessment {
        if topic_title.trim().is_empty() {
            return DriftAssessment::settled(DriftReason::BlankTitle, 0.0);
        }

        if recent_messages.is_empty() && new_message.is_empty() {
            return DriftAssessment::settled(DriftReason::NothingToEvaluate, 0.0);
        }

        let threshold = self.config.min_similarity_threshold;
        let title_tokens = token_set(topic_title);

        let new_message_similarity = jaccard(&title_tokens, &token_set(new_message));
        if new_message_similarity >= threshold {
            return DriftAssessment::settled(DriftReason::NewMessageOnTopic, new_message_similarity);
        }

        let off_topic_in_window = recent_messages
            .iter()
            .map(AsRef::as_ref)
            .filter(|msg| !msg.trim().is_empty())
            .filter(|msg| jaccard(&title_tokens, &token_set(msg)) < threshold)
            .count();

        let off_topic_count = off_topic_in_window + 1;
        let drifted = off_topic_count >= self.config.min_off_topic_messages;

        DriftAssessment {
            drifted,
            reason: if drifted {
                DriftReason::OffTopic
            } else {
                DriftReason::TooFewOffTopic
            },
            new_message_similarity,
            off_topic_count,
        }
    }

    /// Verdict only.
    pub fn detect<S: AsRef<str>>(
        &self,
        topic_title: &str,
        recent_messages: &[S],
        new_message: &str,
    ) -> bool {
        self.evaluate(topic_title, recent_messages, new_message)
            .drifted
    }
}

/// Detect whether a topic has drifted from its title.
pub fn detect_drift<S: AsRef<str>>(
    topic_title: &str,
    recent_messages: &[S],
    new_message: &str,
    config: &DriftConfig,
) -> bool {
    DriftDetector::new(config.clone()).detect(topic_title, recent_messages, new_message)
}
