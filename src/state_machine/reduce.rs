//! Pure state reduction
//!
//! `reduce` is total: every action/state pair yields a state, nothing panics,
//! and referential problems (unknown message ids, fields without a component)
//! are logged and otherwise ignored.

use super::{ChatAction, ChatState, Message};
use crate::component::ComponentData;
use crate::wire::StreamEvent;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Fold one action into the conversation state
///
/// Returns the same `Arc` when the action changes nothing, so callers can
/// detect changes with `Arc::ptr_eq`.
#[must_use]
pub fn reduce(state: &Arc<ChatState>, action: ChatAction) -> Arc<ChatState> {
    match action {
        ChatAction::EventReceived { event, received_at } => apply_event(state, event, received_at),

        ChatAction::ConnectionChanged { connected } => {
            let error = if connected { None } else { state.error.clone() };
            replace_flags(state, connected, error)
        }

        ChatAction::ErrorOccurred { message } => replace_flags(state, false, Some(message)),

        ChatAction::Reset => {
            if **state == ChatState::default() {
                Arc::clone(state)
            } else {
                Arc::new(ChatState::default())
            }
        }
    }
}

fn apply_event(
    state: &Arc<ChatState>,
    event: StreamEvent,
    received_at: DateTime<Utc>,
) -> Arc<ChatState> {
    match event {
        StreamEvent::MessageStart(start) => {
            if state.message(&start.message_id).is_some() {
                tracing::warn!(message_id = %start.message_id, "Duplicate message_start ignored");
                return Arc::clone(state);
            }
            let mut messages = state.messages.clone();
            messages.push(Arc::new(Message::new(
                start.message_id,
                start.role,
                received_at,
            )));
            with_messages(state, messages)
        }

        StreamEvent::TextChunk(chunk) => {
            update_message(state, &chunk.message_id, "text_chunk", |m| {
                Some(m.with_chunk(chunk.index, &chunk.chunk))
            })
        }

        StreamEvent::MessageEnd(end) => {
            update_message(state, &end.message_id, "message_end", |m| {
                Some(m.completed())
            })
        }

        StreamEvent::ComponentStart(start) => {
            update_message(state, &start.message_id, "component_start", |m| {
                Some(m.with_component(ComponentData::new(start.component_type)))
            })
        }

        StreamEvent::ComponentField(field) => {
            update_message(state, &field.message_id, "component_field", |m| {
                let Some(component) = &m.component else {
                    tracing::warn!(
                        message_id = %field.message_id,
                        field = %field.field,
                        "component_field before component_start ignored"
                    );
                    return None;
                };
                Some(m.with_component(component.with_field(&field.field, &field.value)))
            })
        }

        StreamEvent::ComponentEnd(end) => {
            tracing::debug!(message_id = %end.message_id, "Component stream ended");
            Arc::clone(state)
        }
    }
}

/// Replace the message `id` with `update(message)`, sharing every other entry
fn update_message(
    state: &Arc<ChatState>,
    id: &str,
    event_name: &str,
    update: impl FnOnce(&Message) -> Option<Message>,
) -> Arc<ChatState> {
    let Some(index) = state.position(id) else {
        tracing::warn!(message_id = %id, event = event_name, "Event for unknown message ignored");
        return Arc::clone(state);
    };

    let current = &state.messages[index];
    let Some(updated) = update(current) else {
        return Arc::clone(state);
    };
    if updated == **current {
        return Arc::clone(state);
    }

    let mut messages = state.messages.clone();
    messages[index] = Arc::new(updated);
    with_messages(state, messages)
}

fn with_messages(state: &ChatState, messages: Vec<Arc<Message>>) -> Arc<ChatState> {
    Arc::new(ChatState {
        messages,
        is_connected: state.is_connected,
        error: state.error.clone(),
    })
}

fn replace_flags(
    state: &Arc<ChatState>,
    is_connected: bool,
    error: Option<String>,
) -> Arc<ChatState> {
    if state.is_connected == is_connected && state.error == error {
        return Arc::clone(state);
    }
    Arc::new(ChatState {
        messages: state.messages.clone(),
        is_connected,
        error,
    })
}
