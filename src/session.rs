//! Chat session
//!
//! Wires a [`ChatStore`] to a [`ConnectionManager`] and exposes the handful
//! of reads and controls a presentation layer needs.

use crate::config::StreamConfig;
use crate::connection::{
    AppLifecycle, ConnectionManager, ConnectionPhase, EventSourceTransport, EventTransport,
};
use crate::state_machine::{ChatAction, ChatState, Message};
use crate::store::{ActionSink, ChatStore};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub struct ChatSession<T: EventTransport> {
    store: ChatStore,
    manager: Arc<ConnectionManager<T, ChatStore>>,
}

impl ChatSession<EventSourceTransport> {
    /// Start a session streaming over HTTP
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn open(config: StreamConfig) -> Result<Self, reqwest::Error> {
        let transport = EventSourceTransport::new(&config)?;
        Ok(Self::start(config, transport))
    }
}

impl<T: EventTransport> ChatSession<T> {
    /// Session with an empty conversation and no connection
    pub fn new(config: StreamConfig, transport: T) -> Self {
        let store = ChatStore::new();
        let manager = Arc::new(ConnectionManager::new(config, transport, store.clone()));
        Self { store, manager }
    }

    /// Session that connects right away
    pub fn start(config: StreamConfig, transport: T) -> Self {
        let session = Self::new(config, transport);
        session.reconnect();
        session
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<ChatState> {
        self.store.snapshot()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Arc<Message>> {
        self.store.snapshot().messages.clone()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.store.snapshot().is_connected
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.store.snapshot().error.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<ChatState>> {
        self.store.subscribe()
    }

    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        self.manager.phase()
    }

    #[must_use]
    pub fn config(&self) -> &StreamConfig {
        self.manager.config()
    }

    /// Drop the current subscription (if any) and open a new one
    pub fn reconnect(&self) {
        self.manager.connect();
    }

    pub fn disconnect(&self) {
        self.manager.disconnect();
    }

    /// Clear the transcript; the connection is left as it is
    pub fn reset(&self) {
        self.store.dispatch(ChatAction::Reset);
    }

    /// Clear the transcript and stream the conversation again from the start
    pub fn restart(&self) {
        self.reset();
        self.reconnect();
    }

    pub fn observe_lifecycle(&self, signals: mpsc::Receiver<AppLifecycle>) {
        self.manager.observe_lifecycle(signals);
    }

    pub fn shutdown(&self) {
        self.manager.shutdown();
    }
}
