//! Conversation state types

use crate::component::ComponentData;
use crate::wire::MessageRole;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Whether a message is still being streamed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Building,
    Complete,
}

/// One conversation turn
///
/// Values are never mutated once shared; every update returns a new
/// `Message` built from the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub status: MessageStatus,
    /// Ascending-index join of `chunks`
    text_content: String,
    #[serde(skip)]
    chunks: BTreeMap<u64, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentData>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    #[must_use]
    pub fn new(id: impl Into<String>, role: MessageRole, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            role,
            status: MessageStatus::Building,
            text_content: String::new(),
            chunks: BTreeMap::new(),
            component: None,
            timestamp,
        }
    }

    #[must_use]
    pub fn text_content(&self) -> &str {
        &self.text_content
    }

    /// Chunks received so far, keyed by sequence index
    #[must_use]
    pub fn chunks(&self) -> &BTreeMap<u64, String> {
        &self.chunks
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == MessageStatus::Complete
    }

    /// Store `chunk` at `index` (last write wins) and rebuild the text
    #[must_use]
    pub fn with_chunk(&self, index: u64, chunk: &str) -> Self {
        let mut chunks = self.chunks.clone();
        chunks.insert(index, chunk.to_string());
        let text_content = chunks.values().map(String::as_str).collect();

        Self {
            text_content,
            chunks,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn completed(&self) -> Self {
        Self {
            status: MessageStatus::Complete,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_component(&self, component: ComponentData) -> Self {
        Self {
            component: Some(component),
            ..self.clone()
        }
    }
}

/// Root of the conversation state
///
/// Held behind an `Arc`; a reduction that changes nothing hands back the same
/// `Arc`, and messages a reduction does not touch stay shared with the
/// previous state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    pub messages: Vec<Arc<Message>>,
    pub is_connected: bool,
    pub error: Option<String>,
}

impl ChatState {
    #[must_use]
    pub fn message(&self, id: &str) -> Option<&Arc<Message>> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.messages.iter().position(|m| m.id == id)
    }

    /// Whether the most recent message is still streaming
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.messages.last().is_some_and(|m| !m.is_complete())
    }
}
