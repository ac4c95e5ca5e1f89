//! Event queue and worker pool.
//!
//! The message-send path holds an [`EventQueue`] and never waits on it: a
//! full or closed queue drops the event. Workers share one receiver and each
//! handle a single event at a time.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use drift_types::{Message, RawTopicTitleEvent, StreamId, TopicTitleEvent, WorkerSettings};

use crate::error::EnqueueError;
use crate::metrics::PipelineMetrics;
use crate::pipeline::SuggestionPipeline;

/// Producer handle for "message sent" events.
#[derive(Clone)]
pub struct EventQueue {
    tx: mpsc::Sender<RawTopicTitleEvent>,
}

impl EventQueue {
    /// Hand an event to the workers without waiting.
    pub fn enqueue(&self, event: RawTopicTitleEvent) -> Result<(), EnqueueError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(event) => {
                warn!(message_id = ?event.message_id, "Event queue full, dropping event");
                EnqueueError::Full
            }
            mpsc::error::TrySendError::Closed(event) => {
                warn!(message_id = ?event.message_id, "Event queue closed, dropping event");
                EnqueueError::Closed
            }
        })
    }

    /// Wait for queue space instead of dropping. For batch producers such
    /// as replay; the message-send path uses [`EventQueue::enqueue`].
    pub async fn send(&self, event: RawTopicTitleEvent) -> Result<(), EnqueueError> {
        self.tx.send(event).await.map_err(|_| EnqueueError::Closed)
    }

    /// Enqueue the event for a message that was just sent.
    pub fn enqueue_message(&self, message: &Message, stream_id: StreamId) -> Result<(), EnqueueError> {
        self.enqueue(TopicTitleEvent::for_message(message, stream_id).into_raw())
    }

    /// Events currently waiting.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Running set of worker tasks.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl WorkerPool {
    /// Spawn `settings.concurrency` workers on the current runtime.
    pub fn start(
        pipeline: Arc<SuggestionPipeline>,
        settings: &WorkerSettings,
        cancel: CancellationToken,
    ) -> (EventQueue, WorkerPool) {
        let concurrency = settings.concurrency.max(1);
        let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let handles = (0..concurrency)
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    rx.clone(),
                    pipeline.clone(),
                    cancel.clone(),
                ))
            })
            .collect();

        info!(
            concurrency,
            queue_capacity = settings.queue_capacity,
            "Worker pool started"
        );

        (EventQueue { tx }, WorkerPool { handles, cancel })
    }

    /// Number of worker tasks.
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Token that stops the workers.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for every worker to exit.
    ///
    /// Workers exit once all `EventQueue` handles are dropped and the queue
    /// is drained, or after cancellation.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker task failed");
            }
        }
        info!("Worker pool stopped");
    }

    /// Cancel the workers and wait for them; in-flight events finish first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.join().await;
    }
}

async fn run_worker(
    worker: usize,
    rx: Arc<Mutex<mpsc::Receiver<RawTopicTitleEvent>>>,
    pipeline: Arc<SuggestionPipeline>,
    cancel: CancellationToken,
) {
    let metrics = pipeline.metrics();

    loop {
        let event = {
            let mut rx = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                guard = rx.lock() => guard,
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = rx.recv() => event,
            }
        };

        let Some(event) = event else {
            break;
        };

        let span = info_span!("topic_title_event", worker, message_id = ?event.message_id);
        let result = AssertUnwindSafe(pipeline.process(&event))
            .catch_unwind()
            .instrument(span)
            .await;

        match result {
            Ok(outcome) => {
                debug!(worker, message_id = ?event.message_id, outcome = outcome.label(), "Event processed");
            }
            Err(panic) => {
                PipelineMetrics::incr(&metrics.panicked);
                error!(
                    worker,
                    message_id = ?event.message_id,
                    panic = %panic_message(panic.as_ref()),
                    "Event processing panicked, event dropped"
                );
            }
        }
    }

    debug!(worker, "Worker exiting");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::sink::ChannelSink;
    use crate::store::{ContextStore, InMemoryStore};
    use async_trait::async_trait;
    use drift_detect::DriftDetector;
    use drift_llm::{MockLlmClient, TitleSuggester};
    use drift_types::{MessageId, RealmId, RecipientId, Stream, SuggestionConfig};

    const PANIC_ID: MessageId = 666;

    /// Store that panics for one message id and delegates otherwise.
    struct PanickyStore(InMemoryStore);

    #[async_trait]
    impl ContextStore for PanickyStore {
        async fn get_message(&self, id: MessageId) -> Result<Option<Message>, StoreError> {
            if id == PANIC_ID {
                panic!("corrupt row {id}");
            }
            self.0.get_message(id).await
        }

        async fn get_stream(
            &self,
            id: StreamId,
            realm_id: RealmId,
        ) -> Result<Option<Stream>, StoreError> {
            self.0.get_stream(id, realm_id).await
        }

        async fn list_recent_topic_messages(
            &self,
            realm_id: RealmId,
            recipient_id: RecipientId,
            topic_name: &str,
            exclude_id: MessageId,
            limit: usize,
        ) -> Result<Vec<String>, StoreError> {
            self.0
                .list_recent_topic_messages(realm_id, recipient_id, topic_name, exclude_id, limit)
                .await
        }
    }

    fn message(id: MessageId, content: &str) -> Message {
        Message {
            id,
            realm_id: 1,
            sender_id: 100,
            recipient_id: 10,
            topic_name: "project deadline".to_string(),
            content: content.to_string(),
        }
    }

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_stream(Stream {
            id: 5,
            realm_id: 1,
            recipient_id: 10,
            name: "general".to_string(),
        });
        store.insert_message(message(1, "totally unrelated chatter"));
        store.insert_message(message(2, "more random talk"));
        store.insert_message(message(3, "another unrelated comment"));
        store
    }

    fn pipeline(
        store: Arc<dyn ContextStore>,
    ) -> (
        Arc<SuggestionPipeline>,
        tokio::sync::mpsc::UnboundedReceiver<crate::sink::Notification>,
    ) {
        let (sink, rx) = ChannelSink::new();
        let pipeline = SuggestionPipeline::new(
            store,
            Arc::new(sink),
            DriftDetector::default(),
            TitleSuggester::new(
                Arc::new(MockLlmClient::new("Random Chatter")),
                "test-model",
                SuggestionConfig::default(),
            ),
        );
        (Arc::new(pipeline), rx)
    }

    fn settings(concurrency: usize, queue_capacity: usize) -> WorkerSettings {
        WorkerSettings {
            concurrency,
            queue_capacity,
        }
    }

    #[tokio::test]
    async fn test_pool_processes_events_until_drained() {
        let (pipeline, mut rx) = pipeline(Arc::new(store()));
        let (queue, pool) = WorkerPool::start(pipeline.clone(), &settings(2, 16), CancellationToken::new());
        assert_eq!(pool.worker_count(), 2);

        queue.enqueue_message(&message(3, "another unrelated comment"), 5).unwrap();
        queue.enqueue(RawTopicTitleEvent::default()).unwrap();
        drop(queue);
        pool.join().await;

        let notification = rx.recv().await.unwrap();
        assert_eq!(notification.event.suggested_topic, "Random Chatter");

        let snapshot = pipeline.metrics().snapshot();
        assert_eq!(snapshot.received, 2);
        assert_eq!(snapshot.suggested, 1);
        assert_eq!(snapshot.invalid_event, 1);
    }

    #[tokio::test]
    async fn test_enqueue_never_blocks_when_full() {
        let (pipeline, _rx) = pipeline(Arc::new(store()));
        let (queue, pool) = WorkerPool::start(pipeline, &settings(1, 1), CancellationToken::new());

        // Workers have not been polled yet on this single-threaded runtime
        queue.enqueue(RawTopicTitleEvent::default()).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.enqueue(RawTopicTitleEvent::default()),
            Err(EnqueueError::Full)
        );

        pool.shutdown().await;
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_is_closed() {
        let (pipeline, _rx) = pipeline(Arc::new(store()));
        let (queue, pool) = WorkerPool::start(pipeline, &settings(2, 4), CancellationToken::new());

        pool.shutdown().await;
        assert_eq!(
            queue.enqueue(RawTopicTitleEvent::default()),
            Err(EnqueueError::Closed)
        );
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let store = store();
        store.insert_message(message(PANIC_ID, "boom"));
        let (pipeline, mut rx) = pipeline(Arc::new(PanickyStore(store)));
        let (queue, pool) = WorkerPool::start(pipeline.clone(), &settings(1, 8), CancellationToken::new());

        queue.enqueue_message(&message(PANIC_ID, "boom"), 5).unwrap();
        queue.enqueue_message(&message(3, "another unrelated comment"), 5).unwrap();
        drop(queue);
        pool.join().await;

        // The same single worker survived the panic and handled the next event
        assert!(rx.recv().await.is_some());
        let snapshot = pipeline.metrics().snapshot();
        assert_eq!(snapshot.panicked, 1);
        assert_eq!(snapshot.suggested, 1);
    }

    #[tokio::test]
    async fn test_cancellation_stops_idle_workers() {
        let (pipeline, _rx) = pipeline(Arc::new(store()));
        let cancel = CancellationToken::new();
        let (queue, pool) = WorkerPool::start(pipeline, &settings(3, 4), cancel.clone());

        assert!(!pool.cancel_token().is_cancelled());
        cancel.cancel();

        // Producers still alive; cancellation alone ends the workers
        pool.join().await;
        assert!(queue.is_empty());
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
