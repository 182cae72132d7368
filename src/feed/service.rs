//! Feed service loop: the connection manager.
//!
//! Owns the single live subscription, the backoff schedule, and the pending
//! reconnect timer. Commands arrive from the application; decoded snapshots
//! and status changes flow back. Everything a superseded subscription emits
//! after `SetEndpoint` is discarded by subscription id, so a late message
//! from a closed connection can never be applied.

use crate::alloc::Snapshot;
use crate::feed::backoff::{self, Backoff};
use crate::feed::protocol::{
    ConnectionStatus, FeedCommand, FeedUpdate, SourceEvent, SubscriptionId, TaggedEvent,
};
use crate::feed::source::EventSource;
use futures::future;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Feed service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Name of the server-sent event carrying allocation updates. Only
    /// events with this name are decoded; everything else is ignored.
    pub event_name: String,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            event_name: "updateAlloc".to_string(),
            initial_delay: backoff::INITIAL_DELAY,
            max_delay: backoff::MAX_DELAY,
        }
    }
}

/// Run the feed service until `Shutdown` or the command channel closes.
///
/// There is no terminal failure state: transport errors of any kind route
/// through the backoff loop and the service retries for as long as it runs.
pub async fn feed_service_loop(
    config: FeedConfig,
    source: Arc<dyn EventSource>,
    mut commands: UnboundedReceiver<FeedCommand>,
    updates: UnboundedSender<FeedUpdate>,
) {
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<TaggedEvent>();
    let mut service = FeedService::new(config, source, event_tx, updates);

    loop {
        // Copied out so the timer branch does not hold a borrow on the
        // service while a handler mutates it.
        let retry_at = service.retry_at;
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(FeedCommand::SetEndpoint(url)) => service.set_endpoint(url),
                Some(FeedCommand::Shutdown) | None => break,
            },
            Some((id, event)) = event_rx.recv() => service.handle_event(id, event),
            () = async {
                match retry_at {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => future::pending::<()>().await,
                }
            }, if retry_at.is_some() => service.retry_now(),
        }
    }

    service.close();
}

struct FeedService {
    config: FeedConfig,
    source: Arc<dyn EventSource>,
    event_tx: UnboundedSender<TaggedEvent>,
    updates: UnboundedSender<FeedUpdate>,
    endpoint: Option<String>,
    subscription: SubscriptionId,
    task: Option<JoinHandle<()>>,
    backoff: Backoff,
    retry_at: Option<Instant>,
}

impl FeedService {
    fn new(
        config: FeedConfig,
        source: Arc<dyn EventSource>,
        event_tx: UnboundedSender<TaggedEvent>,
        updates: UnboundedSender<FeedUpdate>,
    ) -> Self {
        let backoff = Backoff::new(config.initial_delay, config.max_delay);
        Self {
            config,
            source,
            event_tx,
            updates,
            endpoint: None,
            subscription: 0,
            task: None,
            backoff,
            retry_at: None,
        }
    }

    /// Switch to a new endpoint: discard any pending retry, reset backoff,
    /// and open a fresh subscription. Idempotent when nothing is open yet.
    fn set_endpoint(&mut self, url: String) {
        debug!("new feed endpoint: {url}");
        self.retry_at = None;
        self.backoff.reset();
        self.endpoint = Some(url);
        self.open();
    }

    /// Open a subscription to the current endpoint under a fresh id. The
    /// previous subscription task is aborted; anything it already queued is
    /// discarded by the id check in `handle_event`.
    fn open(&mut self) {
        let Some(url) = self.endpoint.clone() else {
            return;
        };
        self.subscription += 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.send_status(ConnectionStatus::Connecting);

        let source = Arc::clone(&self.source);
        let id = self.subscription;
        let events = self.event_tx.clone();
        self.task = Some(tokio::spawn(async move {
            source.subscribe(url, id, events).await;
        }));
    }

    fn handle_event(&mut self, id: SubscriptionId, event: SourceEvent) {
        if id != self.subscription {
            // Late event from a superseded connection; must not touch state.
            debug!("discarding event from stale subscription {id}");
            return;
        }

        match event {
            SourceEvent::Opened => {
                self.backoff.reset();
                self.send_status(ConnectionStatus::Connected);
            }
            SourceEvent::Message { event, data } if event == self.config.event_name => {
                match Snapshot::parse(&data) {
                    Ok(snapshot) => {
                        debug!("allocation update: {} entries", snapshot.len());
                        let _ = self.updates.send(FeedUpdate::Snapshot(snapshot));
                    }
                    // The previous snapshot stays in place; one bad message
                    // is isolated to that message.
                    Err(err) => warn!("dropping allocation update: {err}"),
                }
            }
            SourceEvent::Message { event, .. } => {
                debug!("ignoring unrelated event type {event:?}");
            }
            SourceEvent::Closed { reason } => {
                let delay = self.backoff.next_delay();
                warn!("feed connection lost ({reason}); retry in {delay:?}");
                self.send_status(ConnectionStatus::Retrying { delay });
                self.retry_at = Some(Instant::now() + delay);
            }
        }
    }

    /// The scheduled retry fired: reconnect to the current endpoint. The
    /// backoff is not reset here; only a successful open or a new endpoint
    /// does that.
    fn retry_now(&mut self) {
        self.retry_at = None;
        self.open();
    }

    fn send_status(&self, status: ConnectionStatus) {
        let _ = self.updates.send(FeedUpdate::Status(status));
    }

    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
