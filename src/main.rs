//! chat-stream - terminal front end for the streaming chat client
//!
//! Connects to the configured SSE endpoint, logs how the conversation state
//! evolves, and accepts line commands on stdin.

use chat_stream::{AppLifecycle, ChatSession, ChatState, ComponentData, Message, StreamConfig};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "commands: r reconnect, d disconnect, x reset, s restart, \
                    bg background, fg foreground, p print, q quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let json = std::env::var_os("CHAT_STREAM_LOG_JSON").is_some();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_stream=info".into()),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr)
        }))
        .with(
            (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    let config = StreamConfig::from_env()?;
    tracing::info!(
        url = %config.url,
        auto_reconnect = config.auto_reconnect,
        reconnect_on_foreground = config.reconnect_on_foreground,
        "Starting chat stream"
    );

    let session = ChatSession::open(config)?;
    let (lifecycle, lifecycle_rx) = mpsc::channel(8);
    session.observe_lifecycle(lifecycle_rx);

    let logger = tokio::spawn(log_state_changes(session.subscribe()));

    eprintln!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let line = tokio::select! {
            _ = &mut ctrl_c => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        match Command::parse(&line) {
            Some(Command::Reconnect) => session.reconnect(),
            Some(Command::Disconnect) => session.disconnect(),
            Some(Command::Reset) => session.reset(),
            Some(Command::Restart) => session.restart(),
            Some(Command::Lifecycle(signal)) => {
                if lifecycle.send(signal).await.is_err() {
                    tracing::warn!("Lifecycle observer is gone");
                }
            }
            Some(Command::Print) => {
                println!("{}", serde_json::to_string_pretty(&*session.snapshot())?);
            }
            Some(Command::Quit) => break,
            None if line.trim().is_empty() => {}
            None => eprintln!("{HELP}"),
        }
    }

    tracing::info!("Shutting down");
    session.shutdown();
    logger.abort();
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Reconnect,
    Disconnect,
    Reset,
    Restart,
    Lifecycle(AppLifecycle),
    Print,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "r" | "reconnect" => Some(Command::Reconnect),
            "d" | "disconnect" => Some(Command::Disconnect),
            "x" | "reset" => Some(Command::Reset),
            "s" | "restart" => Some(Command::Restart),
            "bg" => Some(Command::Lifecycle(AppLifecycle::Background)),
            "fg" => Some(Command::Lifecycle(AppLifecycle::Active)),
            "p" | "print" => Some(Command::Print),
            "q" | "quit" => Some(Command::Quit),
            _ => None,
        }
    }
}

async fn log_state_changes(rx: watch::Receiver<Arc<ChatState>>) {
    let mut states = WatchStream::new(rx);
    let Some(mut previous) = states.next().await else {
        return;
    };
    while let Some(next) = states.next().await {
        log_transition(&previous, &next);
        previous = next;
    }
}

fn log_transition(previous: &ChatState, next: &ChatState) {
    if previous.is_connected != next.is_connected {
        tracing::info!(connected = next.is_connected, "Connection changed");
    }
    if previous.error != next.error {
        if let Some(error) = &next.error {
            tracing::warn!(%error, "Stream error");
        }
    }
    if next.messages.is_empty() && !previous.messages.is_empty() {
        tracing::info!("Transcript cleared");
        return;
    }

    for message in &next.messages {
        match previous.message(&message.id) {
            Some(before) if Arc::ptr_eq(before, message) => {}
            Some(before) => log_message_update(before, message),
            None => tracing::info!(id = %message.id, role = %message.role, "New message"),
        }
    }

    if previous.is_streaming() && !next.is_streaming() {
        tracing::info!(messages = next.messages.len(), "Conversation idle");
    }
}

fn log_message_update(before: &Message, message: &Message) {
    if before.text_content() != message.text_content() {
        tracing::info!(id = %message.id, text = message.text_content(), "Text");
    }

    let was_complete = before
        .component
        .as_ref()
        .is_some_and(ComponentData::is_complete);
    match &message.component {
        Some(component) if component.is_complete() && !was_complete => {
            tracing::info!(
                id = %message.id,
                component = %component.kind(),
                view = ?component.view(),
                "Component complete"
            );
        }
        Some(component) if before.component.is_none() => {
            tracing::info!(id = %message.id, component = %component.kind(), "Component started");
        }
        _ => {}
    }

    if message.is_complete() && !before.is_complete() {
        tracing::info!(id = %message.id, "Message complete");
    }
}
