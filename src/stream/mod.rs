//! # Stream Module
//!
//! Live telemetry subscription and event routing.
//!
//! This module handles:
//! - The [`Transport`] seam: connectivity signals plus named events
//! - Decoding named events ([`event`])
//! - A Socket.IO-over-WebSocket transport ([`socketio`])
//! - Routing events to the normalizer and sinks ([`dispatcher`])

pub mod dispatcher;
pub mod event;
pub mod socketio;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;

pub use dispatcher::{ConnectionStatus, DispatchStats, StreamDispatcher};
pub use event::InboundEvent;
pub use socketio::SocketIoTransport;

/// What a transport delivers to the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connectivity established (or re-established)
    Connected,
    /// Connectivity lost; the transport may reconnect on its own
    Disconnected,
    /// A named event with its JSON payload
    Message { name: String, payload: Value },
}

impl TransportEvent {
    pub fn message(name: impl Into<String>, payload: Value) -> Self {
        TransportEvent::Message {
            name: name.into(),
            payload,
        }
    }
}

/// Ordered source of transport events
#[async_trait]
pub trait Transport: Send {
    /// Next event in delivery order; `None` once the transport is closed for good.
    async fn next_event(&mut self) -> Option<TransportEvent>;
}

/// In-memory transport replaying a fixed event sequence
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    events: VecDeque<TransportEvent>,
}

impl ScriptedTransport {
    pub fn new(events: impl IntoIterator<Item = TransportEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn push(&mut self, event: TransportEvent) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.pop_front()
    }
}
