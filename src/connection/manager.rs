//! Connection lifecycle
//!
//! One manager, at most one live subscription. Each subscription is tagged
//! with a generation; actions are only forwarded while holding the dispatch
//! gate and only if the subscription's generation is still current. Teardown
//! bumps the generation under the same gate, so once `connect()` or
//! `disconnect()` returns nothing from a superseded subscription reaches the
//! sink.

use super::lifecycle::AppLifecycle;
use super::transport::{EventTransport, SignalStream, TransportSignal};
use crate::config::StreamConfig;
use crate::state_machine::ChatAction;
use crate::store::ActionSink;
use crate::wire::StreamEvent;
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Where the current connection attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// No subscription
    Idle,
    /// Subscription requested, waiting for the open signal
    Connecting,
    Connected,
    /// The stream failed or ended; waiting for an explicit reconnect
    Disconnected,
}

struct Gate {
    generation: u64,
    phase: ConnectionPhase,
}

/// State shared between the manager and its forwarding task
struct Shared<S> {
    sink: S,
    gate: Mutex<Gate>,
}

impl<S: ActionSink> Shared<S> {
    /// Dispatch `actions` and move to `phase` if `generation` is still current
    ///
    /// Returns false when the subscription has been superseded.
    fn forward(
        &self,
        generation: u64,
        phase: Option<ConnectionPhase>,
        actions: impl IntoIterator<Item = ChatAction>,
    ) -> bool {
        let mut gate = self.gate.lock();
        if gate.generation != generation {
            return false;
        }
        if let Some(phase) = phase {
            gate.phase = phase;
        }
        for action in actions {
            self.sink.dispatch(action);
        }
        true
    }
}

struct Subscription {
    generation: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Subscription {
    fn stop(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Owns the event-stream subscription for one chat session
pub struct ConnectionManager<T, S>
where
    T: EventTransport,
    S: ActionSink + 'static,
{
    config: StreamConfig,
    transport: T,
    shared: Arc<Shared<S>>,
    active: Mutex<Option<Subscription>>,
    lifecycle_observer: Mutex<Option<JoinHandle<()>>>,
}

impl<T, S> ConnectionManager<T, S>
where
    T: EventTransport,
    S: ActionSink + 'static,
{
    pub fn new(config: StreamConfig, transport: T, sink: S) -> Self {
        Self {
            config,
            transport,
            shared: Arc::new(Shared {
                sink,
                gate: Mutex::new(Gate {
                    generation: 0,
                    phase: ConnectionPhase::Idle,
                }),
            }),
            active: Mutex::new(None),
            lifecycle_observer: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        self.shared.gate.lock().phase
    }

    /// Whether a subscription exists and its forwarding task is still running
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|sub| !sub.task.is_finished())
    }

    /// Open a fresh subscription, tearing down any existing one first
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) {
        let mut active = self.active.lock();
        self.teardown(&mut active);

        let generation = {
            let mut gate = self.shared.gate.lock();
            gate.phase = ConnectionPhase::Connecting;
            gate.generation
        };

        tracing::info!(url = %self.config.url, generation, "Connecting to event stream");

        let cancel = CancellationToken::new();
        let stream = self.transport.open(&self.config);
        let task = tokio::spawn(forward_signals(
            Arc::clone(&self.shared),
            stream,
            generation,
            cancel.clone(),
            self.config.auto_reconnect,
        ));

        *active = Some(Subscription {
            generation,
            cancel,
            task,
        });
    }

    /// Tear down the active subscription, if any
    ///
    /// Always reports the connection as down; safe to call repeatedly.
    pub fn disconnect(&self) {
        let mut active = self.active.lock();
        self.teardown(&mut active);
    }

    fn teardown(&self, active: &mut Option<Subscription>) {
        {
            let mut gate = self.shared.gate.lock();
            gate.generation += 1;
            gate.phase = ConnectionPhase::Idle;
            self.shared.sink.dispatch(ChatAction::connection_changed(false));
        }

        if let Some(subscription) = active.take() {
            tracing::info!(generation = subscription.generation, "Closing event stream");
            subscription.stop();
        }
    }

    fn on_lifecycle(&self, signal: AppLifecycle) {
        match signal {
            AppLifecycle::Active if self.config.reconnect_on_foreground => {
                tracing::info!("Host returned to foreground, reconnecting");
                self.connect();
            }
            AppLifecycle::Active => {
                tracing::debug!("Host returned to foreground, waiting for explicit reconnect");
            }
            AppLifecycle::Inactive | AppLifecycle::Background => {
                tracing::info!(state = ?signal, "Host left foreground, disconnecting");
                self.disconnect();
            }
        }
    }

    /// Disconnect and stop observing host lifecycle signals
    pub fn shutdown(&self) {
        if let Some(observer) = self.lifecycle_observer.lock().take() {
            observer.abort();
        }
        self.disconnect();
    }
}

impl<T, S> ConnectionManager<T, S>
where
    T: EventTransport,
    S: ActionSink + 'static,
{
    /// Follow host foreground/background transitions for the manager's lifetime
    ///
    /// Replaces any previously registered observer.
    pub fn observe_lifecycle(self: &Arc<Self>, mut signals: mpsc::Receiver<AppLifecycle>) {
        let manager: Weak<Self> = Arc::downgrade(self);
        let observer = tokio::spawn(async move {
            while let Some(signal) = signals.recv().await {
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                manager.on_lifecycle(signal);
            }
            tracing::debug!("Lifecycle observer stopped");
        });

        if let Some(previous) = self.lifecycle_observer.lock().replace(observer) {
            previous.abort();
        }
    }
}

impl<T, S> Drop for ConnectionManager<T, S>
where
    T: EventTransport,
    S: ActionSink + 'static,
{
    fn drop(&mut self) {
        if let Some(observer) = self.lifecycle_observer.get_mut().take() {
            observer.abort();
        }
        self.shared.gate.lock().generation += 1;
        if let Some(subscription) = self.active.get_mut().take() {
            subscription.stop();
        }
    }
}

/// Pump transport signals into the sink until cancelled or superseded
async fn forward_signals<S: ActionSink>(
    shared: Arc<Shared<S>>,
    mut stream: SignalStream,
    generation: u64,
    cancel: CancellationToken,
    auto_reconnect: bool,
) {
    loop {
        let signal = tokio::select! {
            () = cancel.cancelled() => return,
            next = stream.next() => next,
        };

        let Some(signal) = signal else {
            tracing::info!(generation, "Event stream ended");
            shared.forward(
                generation,
                Some(ConnectionPhase::Disconnected),
                [ChatAction::connection_changed(false)],
            );
            return;
        };

        let current = match signal {
            TransportSignal::Open => {
                tracing::info!(generation, "Event stream connected");
                shared.forward(
                    generation,
                    Some(ConnectionPhase::Connected),
                    [ChatAction::connection_changed(true)],
                )
            }

            TransportSignal::Event { name, data } => match StreamEvent::decode(&name, &data) {
                Ok(Some(event)) => {
                    tracing::trace!(
                        event = event.name(),
                        message_id = %event.message_id(),
                        "Stream event"
                    );
                    shared.forward(generation, None, [ChatAction::event_received(event)])
                }
                Ok(None) => {
                    tracing::debug!(event = %name, "Ignoring unknown stream event");
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping malformed stream event");
                    true
                }
            },

            TransportSignal::Ended => {
                tracing::info!(generation, "Event stream closed by server, waiting for retry");
                shared.forward(
                    generation,
                    Some(ConnectionPhase::Connecting),
                    [ChatAction::connection_changed(false)],
                )
            }

            TransportSignal::Error(message) => {
                tracing::warn!(generation, error = %message, "Event stream error");
                let phase = if auto_reconnect {
                    ConnectionPhase::Connecting
                } else {
                    ConnectionPhase::Disconnected
                };
                let current = shared.forward(
                    generation,
                    Some(phase),
                    [
                        ChatAction::error_occurred(message),
                        ChatAction::connection_changed(false),
                    ],
                );
                if !auto_reconnect {
                    return;
                }
                current
            }
        };

        if !current {
            tracing::debug!(generation, "Subscription superseded, stopping");
            return;
        }
    }
}
