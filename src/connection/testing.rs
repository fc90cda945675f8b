//! Mock implementations for testing
//!
//! These mocks drive the connection manager without a network.

use super::transport::{EventTransport, SignalStream, TransportSignal};
use crate::config::StreamConfig;
use crate::state_machine::ChatAction;
use crate::store::ActionSink;
use crate::wire::StreamEvent;
use futures::StreamExt;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport whose streams are fed by hand
///
/// Every `open` creates a fresh channel; the test pushes signals through the
/// sender returned by [`MockTransport::sender`].
#[derive(Default)]
pub struct MockTransport {
    opened: Mutex<Vec<mpsc::UnboundedSender<TransportSignal>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscriptions opened so far
    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    /// Sender feeding the `n`th opened stream
    pub fn sender(&self, n: usize) -> mpsc::UnboundedSender<TransportSignal> {
        self.opened.lock().unwrap()[n].clone()
    }

    /// Sender feeding the most recently opened stream
    pub fn latest(&self) -> mpsc::UnboundedSender<TransportSignal> {
        let opened = self.opened.lock().unwrap();
        opened.last().expect("no stream opened").clone()
    }

    /// Drop every sender so the opened streams end
    pub fn close_all(&self) {
        self.opened.lock().unwrap().clear();
    }
}

impl EventTransport for MockTransport {
    fn open(&self, _config: &StreamConfig) -> SignalStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.opened.lock().unwrap().push(tx);
        UnboundedReceiverStream::new(rx).boxed()
    }
}

// ============================================================================
// Recording Sink
// ============================================================================

/// Sink that records every dispatched action
#[derive(Default)]
pub struct RecordingSink {
    actions: Mutex<Vec<ChatAction>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<ChatAction> {
        self.actions.lock().unwrap().clone()
    }

    /// Values of every `ConnectionChanged` dispatched, in order
    pub fn connection_changes(&self) -> Vec<bool> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                ChatAction::ConnectionChanged { connected } => Some(connected),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<StreamEvent> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                ChatAction::EventReceived { event, .. } => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                ChatAction::ErrorOccurred { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.actions.lock().unwrap().clear();
    }
}

impl ActionSink for RecordingSink {
    fn dispatch(&self, action: ChatAction) {
        self.actions.lock().unwrap().push(action);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Poll `check` until it holds, panicking after a second
pub async fn eventually(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Await `fut`, panicking after a second
pub async fn within<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(1), fut)
        .await
        .expect("future did not complete in time")
}

/// SSE payload for a `message_start`
pub fn message_start(id: &str) -> TransportSignal {
    TransportSignal::Event {
        name: "message_start".to_string(),
        data: format!(r#"{{"event":"message_start","messageId":"{id}","role":"agent"}}"#),
    }
}

/// SSE payload for a `text_chunk`
pub fn text_chunk(id: &str, chunk: &str, index: u64) -> TransportSignal {
    TransportSignal::Event {
        name: "text_chunk".to_string(),
        data: format!(
            r#"{{"event":"text_chunk","messageId":"{id}","chunk":"{chunk}","index":{index}}}"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_feeds_opened_stream() {
        let transport = MockTransport::new();
        let config = StreamConfig::new("http://localhost/stream").unwrap();
        let mut stream = transport.open(&config);

        transport.sender(0).send(TransportSignal::Open).unwrap();
        transport.latest().send(message_start("m1")).unwrap();

        assert_eq!(stream.next().await, Some(TransportSignal::Open));
        assert_eq!(stream.next().await, Some(message_start("m1")));
        assert_eq!(transport.open_count(), 1);
    }

    #[test]
    fn test_recording_sink_filters() {
        let sink = RecordingSink::new();
        sink.dispatch(ChatAction::connection_changed(true));
        sink.dispatch(ChatAction::error_occurred("boom"));
        sink.dispatch(ChatAction::connection_changed(false));

        assert_eq!(sink.connection_changes(), [true, false]);
        assert_eq!(sink.errors(), ["boom"]);
        assert!(sink.events().is_empty());

        sink.clear();
        assert!(sink.actions().is_empty());
    }
}
