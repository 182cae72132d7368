//! Live feed subsystem: the connection manager.
//!
//! Maintains a best-effort continuous subscription to a server-push endpoint,
//! reconnecting with exponential backoff, and delivers every successfully
//! decoded allocation snapshot downstream along with connection status.

pub mod backoff;
pub mod protocol;
pub mod service;
pub mod source;

// Re-export public API. Modules outside this crate should prefer importing
// from `crate::feed` rather than reaching into submodules.
pub use backoff::Backoff;
pub use protocol::{
    ConnectionStatus, FeedCommand, FeedUpdate, SourceEvent, SubscriptionId, TaggedEvent,
};
pub use service::{feed_service_loop, FeedConfig};
pub use source::{EventSource, SseSource};
