//! Streaming chat client core
//!
//! Consumes an assistant conversation streamed over Server-Sent Events and
//! folds it into a render-ready [`ChatState`]: text assembled from indexed
//! chunks and structured components materialized field by field.
//!
//! The pieces, leaves first:
//!
//! - [`component`]: component kinds and the completeness oracle
//! - [`wire`]: stream event payloads
//! - [`state_machine`]: the pure conversation reducer
//! - [`store`]: serialized action dispatch and state snapshots
//! - [`connection`]: the stream subscription and its lifecycle
//! - [`session`]: a store and a connection wired together

pub mod component;
pub mod config;
pub mod connection;
pub mod error;
pub mod session;
pub mod state_machine;
pub mod store;
pub mod wire;

pub use component::{is_complete, ComponentData, ComponentKind, ComponentView};
pub use config::StreamConfig;
pub use connection::{AppLifecycle, ConnectionManager, ConnectionPhase};
pub use error::{ConfigError, DecodeError};
pub use session::ChatSession;
pub use state_machine::{reduce, ChatAction, ChatState, Message, MessageStatus};
pub use store::{ActionSink, ChatStore};
pub use wire::{MessageRole, StreamEvent};
