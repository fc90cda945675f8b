//! Stream event wire format
//!
//! Six named SSE events, each with a JSON payload using camelCase keys.
//! The payload repeats the event name in an `event` field; decoding is keyed
//! by the SSE event name, and the embedded tag is only consulted for events
//! sent under the generic `message` name.

use crate::component::ComponentKind;
use crate::error::DecodeError;
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
}

impl MessageRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Agent => "agent",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStart {
    pub message_id: String,
    pub role: MessageRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChunk {
    pub message_id: String,
    pub chunk: String,
    pub index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnd {
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStart {
    pub message_id: String,
    pub component_type: ComponentKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentField {
    pub message_id: String,
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEnd {
    pub message_id: String,
}

/// A decoded stream event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    MessageStart(MessageStart),
    TextChunk(TextChunk),
    MessageEnd(MessageEnd),
    ComponentStart(ComponentStart),
    ComponentField(ComponentField),
    ComponentEnd(ComponentEnd),
}

/// Default SSE event name used when the server omits the `event:` line
const GENERIC_EVENT_NAME: &str = "message";

impl StreamEvent {
    /// Decode a raw SSE event
    ///
    /// Returns `Ok(None)` for event names this client does not know about.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the payload is not valid JSON for the event.
    pub fn decode(name: &str, data: &str) -> Result<Option<Self>, DecodeError> {
        fn parse<'a, T: Deserialize<'a>>(name: &str, data: &'a str) -> Result<T, DecodeError> {
            serde_json::from_str(data).map_err(|source| DecodeError::Payload {
                event: name.to_string(),
                source,
            })
        }

        let event = match name {
            "message_start" => StreamEvent::MessageStart(parse(name, data)?),
            "text_chunk" => StreamEvent::TextChunk(parse(name, data)?),
            "message_end" => StreamEvent::MessageEnd(parse(name, data)?),
            "component_start" => StreamEvent::ComponentStart(parse(name, data)?),
            "component_field" => StreamEvent::ComponentField(parse(name, data)?),
            "component_end" => StreamEvent::ComponentEnd(parse(name, data)?),
            GENERIC_EVENT_NAME => parse(name, data)?,
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    /// The message this event targets
    #[must_use]
    pub fn message_id(&self) -> &str {
        match self {
            StreamEvent::MessageStart(e) => &e.message_id,
            StreamEvent::TextChunk(e) => &e.message_id,
            StreamEvent::MessageEnd(e) => &e.message_id,
            StreamEvent::ComponentStart(e) => &e.message_id,
            StreamEvent::ComponentField(e) => &e.message_id,
            StreamEvent::ComponentEnd(e) => &e.message_id,
        }
    }

    /// Wire name of the event
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::MessageStart(_) => "message_start",
            StreamEvent::TextChunk(_) => "text_chunk",
            StreamEvent::MessageEnd(_) => "message_end",
            StreamEvent::ComponentStart(_) => "component_start",
            StreamEvent::ComponentField(_) => "component_field",
            StreamEvent::ComponentEnd(_) => "component_end",
        }
    }
}
