//! Protocol definitions shared between the feed service, its transport
//! sources, and the application runtime.

use crate::alloc::Snapshot;
use std::time::Duration;

/// Identifier attached to each subscription so events from a superseded
/// connection can be discarded instead of mutating current state.
pub type SubscriptionId = u64;

/// Raw events a transport source emits for one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// The connection is established and the event stream is live.
    Opened,
    /// One named server-sent event with its data payload.
    Message { event: String, data: String },
    /// The connection failed or the stream ended. Terminal for this
    /// subscription; the service schedules the retry.
    Closed { reason: String },
}

/// A source event tagged with the subscription that produced it.
pub type TaggedEvent = (SubscriptionId, SourceEvent);

/// Commands sent from the application to the feed service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    /// Close any existing subscription, reset backoff, and subscribe to the
    /// given endpoint URL. A pending scheduled retry is discarded.
    SetEndpoint(String),
    Shutdown,
}

/// Updates emitted by the feed service back to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    /// A successfully decoded allocation list, replacing all prior state.
    Snapshot(Snapshot),
    /// Connection status changed.
    Status(ConnectionStatus),
}

/// Connection lifecycle as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Retrying { delay: Duration },
}

impl ConnectionStatus {
    /// Status-line text for this state.
    pub fn label(&self) -> String {
        match self {
            ConnectionStatus::Connecting => "connecting…".to_string(),
            ConnectionStatus::Connected => "connected".to_string(),
            ConnectionStatus::Retrying { delay } => {
                format!("connection: retry in {}s", delay.as_secs_f64())
            }
        }
    }
}
