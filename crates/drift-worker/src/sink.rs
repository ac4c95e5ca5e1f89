//! Notification delivery seam.
//!
//! Delivery is fire-and-forget: the pipeline does not observe failures, so
//! sinks log their own problems.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

use drift_types::{RealmId, TopicTitleSuggestion, UserId};

/// Delivers suggestion events to users.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Send `event` to `recipients` within `realm_id`.
    async fn notify(&self, realm_id: RealmId, event: TopicTitleSuggestion, recipients: &[UserId]);
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub realm_id: RealmId,
    pub recipients: Vec<UserId>,
    pub event: TopicTitleSuggestion,
}

/// Sink that forwards notifications over an unbounded channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Create a sink and the receiver observing it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn notify(&self, realm_id: RealmId, event: TopicTitleSuggestion, recipients: &[UserId]) {
        let notification = Notification {
            realm_id,
            recipients: recipients.to_vec(),
            event,
        };
        if self.tx.send(notification).is_err() {
            warn!(realm_id, "Notification receiver dropped");
        }
    }
}

/// Sink that writes each notification as one JSON line.
pub struct LogSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LogSink {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Sink writing to stdout.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    fn write_line(&self, notification: &Notification) -> Result<(), String> {
        let line = serde_json::to_string(notification).map_err(|e| e.to_string())?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| "writer lock poisoned".to_string())?;
        writeln!(writer, "{line}").map_err(|e| e.to_string())?;
        writer.flush().map_err(|e| e.to_string())
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, realm_id: RealmId, event: TopicTitleSuggestion, recipients: &[UserId]) {
        let notification = Notification {
            realm_id,
            recipients: recipients.to_vec(),
            event,
        };
        if let Err(e) = self.write_line(&notification) {
            warn!(realm_id, error = %e, "Failed to write notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn suggestion() -> TopicTitleSuggestion {
        TopicTitleSuggestion {
            message_id: 42,
            stream_id: 7,
            current_topic: "project deadline".to_string(),
            suggested_topic: "Pizza Planning".to_string(),
        }
    }

    #[tokio::test]
    async fn test_channel_sink_delivers() {
        let (sink, mut rx) = ChannelSink::new();
        sink.notify(2, suggestion(), &[100]).await;

        let notification = rx.recv().await.unwrap();
        assert_eq!(notification.realm_id, 2);
        assert_eq!(notification.recipients, vec![100]);
        assert_eq!(notification.event.suggested_topic, "Pizza Planning");
    }

    #[tokio::test]
    async fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.notify(2, suggestion(), &[100]).await;
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_log_sink_writes_json_lines() {
        let buf = SharedBuf::default();
        let sink = LogSink::new(Box::new(buf.clone()));
        sink.notify(2, suggestion(), &[100]).await;
        sink.notify(3, suggestion(), &[101]).await;

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["realm_id"], 2);
        assert_eq!(first["recipients"][0], 100);
        assert_eq!(first["event"]["type"], "topic_title_suggestion");
        assert_eq!(first["event"]["suggested_topic"], "Pizza Planning");
    }
}
