//! Counters for pipeline outcomes and LLM usage.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics for the suggestion pipeline.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    pub received: AtomicU64,
    pub invalid_event: AtomicU64,
    pub not_found: AtomicU64,
    pub stale_content: AtomicU64,
    pub no_drift: AtomicU64,
    pub no_suggestion: AtomicU64,
    pub suggested: AtomicU64,
    pub failed: AtomicU64,
    pub panicked: AtomicU64,
    pub llm_calls: AtomicU64,
    pub llm_timeouts: AtomicU64,
    pub llm_failures: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counts as a snapshot.
    pub fn snapshot(&self) -> PipelineMetricsSnapshot {
        PipelineMetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            invalid_event: self.invalid_event.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            stale_content: self.stale_content.load(Ordering::Relaxed),
            no_drift: self.no_drift.load(Ordering::Relaxed),
            no_suggestion: self.no_suggestion.load(Ordering::Relaxed),
            suggested: self.suggested.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            llm_calls: self.llm_calls.load(Ordering::Relaxed),
            llm_timeouts: self.llm_timeouts.load(Ordering::Relaxed),
            llm_failures: self.llm_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of pipeline metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineMetricsSnapshot {
    pub received: u64,
    pub invalid_event: u64,
    pub not_found: u64,
    pub stale_content: u64,
    pub no_drift: u64,
    pub no_suggestion: u64,
    pub suggested: u64,
    pub failed: u64,
    pub panicked: u64,
    pub llm_calls: u64,
    pub llm_timeouts: u64,
    pub llm_failures: u64,
}

impl PipelineMetricsSnapshot {
    /// Events discarded before drift evaluation.
    pub fn total_rejected(&self) -> u64 {
        self.invalid_event + self.not_found + self.stale_content
    }

    /// Events that reached a terminal state, panics included.
    pub fn total_completed(&self) -> u64 {
        self.total_rejected()
            + self.no_drift
            + self.no_suggestion
            + self.suggested
            + self.failed
            + self.panicked
    }

    /// Events where drift was flagged.
    pub fn total_drifted(&self) -> u64 {
        self.no_suggestion + self.suggested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_totals() {
        let metrics = PipelineMetrics::new();
        PipelineMetrics::incr(&metrics.invalid_event);
        PipelineMetrics::incr(&metrics.stale_content);
        PipelineMetrics::incr(&metrics.no_drift);
        PipelineMetrics::incr(&metrics.suggested);
        PipelineMetrics::incr(&metrics.no_suggestion);
        PipelineMetrics::incr(&metrics.panicked);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_rejected(), 2);
        assert_eq!(snapshot.total_drifted(), 2);
        assert_eq!(snapshot.total_completed(), 6);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(PipelineMetrics::new().snapshot()).unwrap();
        assert_eq!(json["suggested"], 0);
        assert_eq!(json["llm_calls"], 0);
    }
}
