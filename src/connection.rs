//! Stream connection management
//!
//! Owns at most one live event-stream subscription and translates its
//! signals into actions for the store.

mod lifecycle;
mod manager;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use lifecycle::AppLifecycle;
pub use manager::{ConnectionManager, ConnectionPhase};
pub use transport::{EventSourceTransport, EventTransport, SignalStream, TransportSignal};
