//! Conversation state reducer
//!
//! Elm-style: a pure `reduce(state, action) -> state` over immutable,
//! `Arc`-shared state.

mod action;
mod reduce;
pub mod state;

#[cfg(test)]
mod proptests;

pub use action::ChatAction;
pub use reduce::reduce;
pub use state::{ChatState, Message, MessageStatus};
