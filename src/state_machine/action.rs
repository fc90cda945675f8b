//! Actions that drive the reducer

use crate::wire::StreamEvent;
use chrono::{DateTime, Utc};

/// Everything that can change the conversation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    /// A decoded stream event; `received_at` stamps any message it creates
    EventReceived {
        event: StreamEvent,
        received_at: DateTime<Utc>,
    },
    ConnectionChanged {
        connected: bool,
    },
    ErrorOccurred {
        message: String,
    },
    Reset,
}

impl ChatAction {
    /// Wrap a stream event, stamped with the current time
    #[must_use]
    pub fn event_received(event: StreamEvent) -> Self {
        ChatAction::EventReceived {
            event,
            received_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn connection_changed(connected: bool) -> Self {
        ChatAction::ConnectionChanged { connected }
    }

    pub fn error_occurred(message: impl Into<String>) -> Self {
        ChatAction::ErrorOccurred {
            message: message.into(),
        }
    }
}
