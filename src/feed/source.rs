//! Transport sources for the feed subscription.
//!
//! The service loop talks to the endpoint through the [`EventSource`] trait
//! so tests can script connection lifecycles without a network. The
//! production implementation subscribes over HTTP and decodes
//! `text/event-stream` frames.

use crate::feed::protocol::{SourceEvent, SubscriptionId, TaggedEvent};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use tokio::sync::mpsc::UnboundedSender;
use tokio_stream::StreamExt;

/// One-shot subscription transport.
///
/// `subscribe` runs a single connection attempt to completion: it emits
/// `Opened` once the stream is live, then `Message` per server-sent event,
/// and finally exactly one `Closed` when the connection fails or ends. Every
/// event is tagged with `id` so the service can discard events from a
/// superseded subscription.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn subscribe(&self, url: String, id: SubscriptionId, events: UnboundedSender<TaggedEvent>);
}

/// Server-sent-event transport over HTTP.
pub struct SseSource {
    client: reqwest::Client,
}

impl SseSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for SseSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSource for SseSource {
    async fn subscribe(
        &self,
        url: String,
        id: SubscriptionId,
        events: UnboundedSender<TaggedEvent>,
    ) {
        // A malformed URL fails here like any refused connection: the service
        // treats both as a transport error and retries.
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                let _ = events.send((id, SourceEvent::Closed { reason: err.to_string() }));
                return;
            }
        };

        if !response.status().is_success() {
            let reason = format!("endpoint returned {}", response.status());
            let _ = events.send((id, SourceEvent::Closed { reason }));
            return;
        }

        if events.send((id, SourceEvent::Opened)).is_err() {
            return;
        }

        let mut stream = Box::pin(response.bytes_stream().eventsource());
        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    let message = SourceEvent::Message {
                        event: event.event,
                        data: event.data,
                    };
                    if events.send((id, message)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    let _ = events.send((id, SourceEvent::Closed { reason: err.to_string() }));
                    return;
                }
            }
        }

        // Server closed the stream cleanly; still a lost connection from the
        // display's point of view.
        let _ = events.send((
            id,
            SourceEvent::Closed {
                reason: "stream ended".to_string(),
            },
        ));
    }
}
