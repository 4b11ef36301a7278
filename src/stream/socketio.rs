//! # Socket.IO Transport
//!
//! Concrete [`Transport`] speaking Socket.IO v5 over Engine.IO v4 on a
//! plain WebSocket (`?EIO=4&transport=websocket`, no long-polling).
//!
//! ## Frames handled
//!
//! | Frame | Meaning | Action |
//! |-------|---------|--------|
//! | `0{...}` | Engine.IO open | reply `40` (join `/`) |
//! | `40{...}` | namespace connected | emit `Connected` |
//! | `2` | ping | reply `3` |
//! | `42["name",payload]` | event | emit `Message` |
//! | `41`, `44{...}`, `1` | disconnect / refused / close | end session |
//!
//! A background task owns the socket and reconnects after
//! `reconnect_interval_ms`. Events reach the dispatcher through an mpsc
//! channel, so [`Transport::next_event`] is cancel-safe inside `select!`.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::event::parse_lenient;
use super::{Transport, TransportEvent};
use crate::config::TransportConfig;
use crate::error::{GroundLinkError, Result};

/// Buffered events between the socket task and the dispatcher
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Reply joining the default namespace
const CONNECT_DEFAULT_NAMESPACE: &str = "40";

/// Reply to an Engine.IO ping
const PONG: &str = "3";

/// Socket.IO packet carried inside an Engine.IO message
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect,
    Disconnect,
    Event { name: String, payload: Value },
    ConnectError(String),
    /// ACK / binary packets; not used by this dashboard
    Other(char),
}

/// Engine.IO packet
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open,
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// Decode one Engine.IO text frame.
///
/// # Errors
///
/// Returns error if the frame is empty, has an unknown packet type, or an
/// event body is not a `["name", payload]` array.
pub fn decode_frame(frame: &str) -> Result<EnginePacket> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| GroundLinkError::Decode("empty frame".to_string()))?;
    let body = chars.as_str();

    match kind {
        '0' => Ok(EnginePacket::Open),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping),
        '3' => Ok(EnginePacket::Pong),
        '4' => decode_socket_packet(body).map(EnginePacket::Message),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(GroundLinkError::Decode(format!("unknown engine packet type '{}'", other))),
    }
}

fn decode_socket_packet(body: &str) -> Result<SocketPacket> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or_else(|| GroundLinkError::Decode("empty socket packet".to_string()))?;
    let rest = skip_namespace(chars.as_str());

    match kind {
        '0' => Ok(SocketPacket::Connect),
        '1' => Ok(SocketPacket::Disconnect),
        '2' => decode_event(rest),
        '4' => {
            let message = parse_lenient(rest)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| rest.to_string());
            Ok(SocketPacket::ConnectError(message))
        }
        other => Ok(SocketPacket::Other(other)),
    }
}

/// Strip an optional `/namespace,` prefix.
fn skip_namespace(rest: &str) -> &str {
    if rest.starts_with('/') {
        match rest.find(',') {
            Some(idx) => &rest[idx + 1..],
            None => "",
        }
    } else {
        rest
    }
}

fn decode_event(rest: &str) -> Result<SocketPacket> {
    // Optional numeric ack id precedes the array
    let array = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    let value = parse_lenient(array)?;

    let Value::Array(mut items) = value else {
        return Err(GroundLinkError::Decode("event body is not an array".to_string()));
    };
    if items.is_empty() {
        return Err(GroundLinkError::Decode("event array is empty".to_string()));
    }

    let name = match items.remove(0) {
        Value::String(name) => name,
        other => return Err(GroundLinkError::Decode(format!("event name is not a string: {}", other))),
    };
    let payload = if items.is_empty() { Value::Null } else { items.remove(0) };

    Ok(SocketPacket::Event { name, payload })
}

/// Live Socket.IO subscription
pub struct SocketIoTransport {
    events: mpsc::Receiver<TransportEvent>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for SocketIoTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketIoTransport").finish_non_exhaustive()
    }
}

impl SocketIoTransport {
    /// Start the connection task. Must be called inside a tokio runtime.
    pub fn spawn(config: TransportConfig) -> Self {
        let (tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let task = tokio::spawn(connection_loop(config, tx));
        Self { events, task }
    }
}

impl Drop for SocketIoTransport {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl Transport for SocketIoTransport {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

async fn connection_loop(config: TransportConfig, tx: mpsc::Sender<TransportEvent>) {
    let connect_timeout = Duration::from_millis(config.connect_timeout_ms);
    let reconnect_interval = Duration::from_millis(config.reconnect_interval_ms);

    loop {
        debug!("Connecting to {}", config.url);

        match timeout(connect_timeout, tokio_tungstenite::connect_async(config.url.as_str())).await {
            Ok(Ok((ws, _))) => {
                info!("WebSocket open at {}", config.url);
                if let Err(e) = run_session(ws, &tx).await {
                    warn!("Stream session ended: {}", e);
                }
            }
            Ok(Err(e)) => warn!("Failed to connect to {}: {}", config.url, e),
            Err(_) => warn!("Timed out connecting to {}", config.url),
        }

        if tx.is_closed() {
            debug!("Dispatcher gone; stopping transport");
            return;
        }
        sleep(reconnect_interval).await;
    }
}

async fn run_session<S>(ws: S, tx: &mpsc::Sender<TransportEvent>) -> Result<()>
where
    S: futures_util::Stream<Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>>
        + futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin,
{
    let (mut write, mut read) = ws.split();
    let mut connected = false;

    let outcome = loop {
        let Some(item) = read.next().await else {
            break Ok(());
        };

        let text = match item {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break Ok(()),
            Ok(_) => continue,
            Err(e) => break Err(GroundLinkError::Transport(format!("read failed: {}", e))),
        };

        let packet = match decode_frame(text.as_str()) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Ignoring malformed frame: {}", e);
                continue;
            }
        };

        let reply = match packet {
            EnginePacket::Open => Some(CONNECT_DEFAULT_NAMESPACE),
            EnginePacket::Ping => Some(PONG),
            EnginePacket::Close => break Ok(()),
            EnginePacket::Message(SocketPacket::Connect) => {
                connected = true;
                if tx.send(TransportEvent::Connected).await.is_err() {
                    break Ok(());
                }
                None
            }
            EnginePacket::Message(SocketPacket::Event { name, payload }) => {
                if tx.send(TransportEvent::Message { name, payload }).await.is_err() {
                    break Ok(());
                }
                None
            }
            EnginePacket::Message(SocketPacket::Disconnect) => break Ok(()),
            EnginePacket::Message(SocketPacket::ConnectError(message)) => {
                break Err(GroundLinkError::Transport(format!("namespace refused: {}", message)));
            }
            EnginePacket::Message(SocketPacket::Other(kind)) => {
                debug!("Ignoring socket packet type '{}'", kind);
                None
            }
            EnginePacket::Pong | EnginePacket::Upgrade | EnginePacket::Noop => None,
        };

        if let Some(reply) = reply {
            if let Err(e) = write.send(Message::Text(reply.to_string().into())).await {
                break Err(GroundLinkError::Transport(format!("write failed: {}", e)));
            }
        }
    };

    if connected {
        let _ = tx.send(TransportEvent::Disconnected).await;
    }
    outcome
}
