//! # drift-worker
//!
//! Asynchronous consumer for "message sent" events.
//!
//! The message-send path enqueues a lightweight event and returns at once.
//! Workers then validate the event, read the topic context, run the local
//! drift heuristic and, only when drift is flagged, ask the LLM for a
//! better title and notify the message's sender.
//!
//! ## Features
//! - Collaborator seams: `ContextStore`, `NotificationSink`, `LlmClient`
//! - Per-event outcome reporting and atomic metrics
//! - Bounded, non-blocking `EventQueue` feeding a `WorkerPool`
//! - Panic isolation per event and cancellation-aware shutdown
//! - In-memory store and channel/log sinks for tests and replay

pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod sink;
pub mod store;

pub use error::{EnqueueError, StoreError};
pub use metrics::{PipelineMetrics, PipelineMetricsSnapshot};
pub use pipeline::{PipelineOutcome, SuggestionPipeline, TopicContext};
pub use queue::{EventQueue, WorkerPool};
pub use sink::{ChannelSink, LogSink, Notification, NotificationSink};
pub use store::{ContextStore, InMemoryStore, StoreFixture};
