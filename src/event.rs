// MIT License - Copyright (c) 2026 Peter Wright
// Events fed into the engine's run loop from outside

use crate::command::Command;
use crate::config::BridgeConfig;

/// Externally triggered work for the engine.
///
/// Senders obtain a handle via `Bridge::handle()`; the engine's run loop
/// services these between polling passes.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// A named command addressed to one entity
    Command {
        address: String,
        command: Command,
        /// Optional parameters; accepted but unused by every command today
        params: Option<serde_json::Value>,
    },
    /// Re-run discovery in refresh mode
    Discover,
    /// Manual full query: panels, zones and the controller's own drivers
    Query,
    /// Apply a new configuration (clears notices, re-discovers)
    ApplyConfig(Box<BridgeConfig>),
}

/// Type alias for the event sender.
pub type EventSender = tokio::sync::mpsc::Sender<BridgeEvent>;

/// Type alias for the event receiver.
pub type EventReceiver = tokio::sync::mpsc::Receiver<BridgeEvent>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::channel(capacity)
}
