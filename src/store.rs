//! State store
//!
//! Owns the current `Arc<ChatState>` and applies actions strictly one at a
//! time. Presentation layers read snapshots or subscribe to changes; they
//! never mutate state directly.

use crate::state_machine::{reduce, ChatAction, ChatState};
use std::sync::Arc;
use tokio::sync::watch;

/// Receiver of actions produced by the connection manager
pub trait ActionSink: Send + Sync {
    fn dispatch(&self, action: ChatAction);
}

impl<T: ActionSink + ?Sized> ActionSink for Arc<T> {
    fn dispatch(&self, action: ChatAction) {
        (**self).dispatch(action);
    }
}

#[derive(Debug, Clone)]
pub struct ChatStore {
    tx: watch::Sender<Arc<ChatState>>,
}

impl ChatStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(ChatState::default()));
        Self { tx }
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> Arc<ChatState> {
        Arc::clone(&self.tx.borrow())
    }

    /// Subscribe to state changes
    ///
    /// Subscribers are only woken when a reduction produced a new state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<ChatState>> {
        self.tx.subscribe()
    }
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionSink for ChatStore {
    fn dispatch(&self, action: ChatAction) {
        // The watch lock serializes reductions
        self.tx.send_if_modified(|current| {
            let next = reduce(current, action);
            if Arc::ptr_eq(current, &next) {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
