//! Event-stream transport
//!
//! The manager only needs "open a persistent stream against a URL and yield
//! open / named event / error signals". [`EventSourceTransport`] provides that
//! over HTTP with `reqwest-eventsource`.

use crate::config::StreamConfig;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use reqwest_eventsource::retry::{Constant, Never};
use reqwest_eventsource::{Error as EsError, Event as EsEvent, EventSource};
use std::sync::Arc;

/// Low-level signal from an open stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSignal {
    /// The connection is established
    Open,
    /// A named SSE event with its raw `data` payload
    Event { name: String, data: String },
    /// The stream failed; more signals follow only if the transport retries
    Error(String),
    /// The server closed the stream cleanly and the transport will reopen it
    ///
    /// A transport that does not retry simply ends the signal stream instead.
    Ended,
}

pub type SignalStream = BoxStream<'static, TransportSignal>;

/// Capability to open a persistent event stream
pub trait EventTransport: Send + Sync + 'static {
    /// Start a new subscription
    ///
    /// Dropping the returned stream must close the underlying connection.
    fn open(&self, config: &StreamConfig) -> SignalStream;
}

impl<T: EventTransport + ?Sized> EventTransport for Arc<T> {
    fn open(&self, config: &StreamConfig) -> SignalStream {
        (**self).open(config)
    }
}

/// SSE over HTTP
#[derive(Debug, Clone)]
pub struct EventSourceTransport {
    http: Client,
}

impl EventSourceTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (e.g. TLS backend failure).
    pub fn new(config: &StreamConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { http })
    }
}

impl EventTransport for EventSourceTransport {
    fn open(&self, config: &StreamConfig) -> SignalStream {
        // EventSource adds `Accept: text/event-stream` itself
        let request = self.http.get(config.url.clone());

        let mut source = match EventSource::new(request) {
            Ok(source) => source,
            Err(e) => {
                let message = format!("Failed to open event stream: {e}");
                return futures::stream::once(async move { TransportSignal::Error(message) })
                    .boxed();
            }
        };

        let auto_reconnect = config.auto_reconnect;
        if auto_reconnect {
            source.set_retry_policy(Box::new(Constant::new(config.retry_interval, None)));
        } else {
            source.set_retry_policy(Box::new(Never));
        }

        futures::stream::unfold(Some(source), move |source| async move {
            let mut source = source?;
            match source.next().await? {
                Ok(EsEvent::Open) => Some((TransportSignal::Open, Some(source))),
                Ok(EsEvent::Message(msg)) => Some((
                    TransportSignal::Event {
                        name: msg.event,
                        data: msg.data,
                    },
                    Some(source),
                )),
                // The server closed the body; not a failure
                Err(EsError::StreamEnded) if auto_reconnect => {
                    Some((TransportSignal::Ended, Some(source)))
                }
                Err(EsError::StreamEnded) => {
                    source.close();
                    None
                }
                Err(e) => {
                    let signal = TransportSignal::Error(e.to_string());
                    if auto_reconnect {
                        Some((signal, Some(source)))
                    } else {
                        source.close();
                        Some((signal, None))
                    }
                }
            }
        })
        .boxed()
    }
}
