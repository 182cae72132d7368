use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

use platboard::feed::protocol::{
    ConnectionStatus, FeedCommand, FeedUpdate, SourceEvent, SubscriptionId, TaggedEvent,
};
use platboard::feed::service::{feed_service_loop, FeedConfig};
use platboard::feed::source::EventSource;
use platboard::Snapshot;

const TIMEOUT_MS: u64 = 5000;

const ALLOC_PAYLOAD: &str =
    r#"[{"type":"local","index":"0G39","time":1700000060000,"track":"1","dir":"Nagase"}]"#;

/// Transport double: records every subscription the service opens so tests
/// can script opens, messages, and failures, including late events tagged
/// with a superseded subscription id.
#[derive(Default)]
struct ScriptedSource {
    subscriptions: Mutex<Vec<Subscription>>,
}

#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    url: String,
    events: UnboundedSender<TaggedEvent>,
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn subscribe(
        &self,
        url: String,
        id: SubscriptionId,
        events: UnboundedSender<TaggedEvent>,
    ) {
        self.subscriptions
            .lock()
            .unwrap()
            .push(Subscription { id, url, events });
    }
}

impl ScriptedSource {
    fn nth(&self, n: usize) -> Option<Subscription> {
        self.subscriptions.lock().unwrap().get(n).cloned()
    }

    fn count(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }
}

fn emit(sub: &Subscription, event: SourceEvent) {
    sub.events.send((sub.id, event)).unwrap();
}

fn message(data: &str) -> SourceEvent {
    SourceEvent::Message {
        event: "updateAlloc".to_string(),
        data: data.to_string(),
    }
}

fn spawn_service() -> (
    Arc<ScriptedSource>,
    UnboundedSender<FeedCommand>,
    UnboundedReceiver<FeedUpdate>,
    tokio::task::JoinHandle<()>,
) {
    let source = Arc::new(ScriptedSource::default());
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();

    let service = tokio::spawn(feed_service_loop(
        FeedConfig::default(),
        Arc::clone(&source) as Arc<dyn EventSource>,
        cmd_rx,
        update_tx,
    ));

    (source, cmd_tx, update_rx, service)
}

async fn next_update(rx: &mut UnboundedReceiver<FeedUpdate>) -> FeedUpdate {
    timeout(Duration::from_millis(TIMEOUT_MS), rx.recv())
        .await
        .expect("feed update timed out")
        .expect("update channel closed unexpectedly")
}

/// Wait for the service to open its `n`-th subscription (0-based).
async fn wait_subscription(source: &ScriptedSource, n: usize) -> Subscription {
    timeout(Duration::from_millis(TIMEOUT_MS), async {
        loop {
            if let Some(sub) = source.nth(n) {
                return sub;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("subscription timed out")
}

async fn shutdown(cmd_tx: UnboundedSender<FeedCommand>, service: tokio::task::JoinHandle<()>) {
    cmd_tx.send(FeedCommand::Shutdown).unwrap();
    service.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn snapshots_apply_in_arrival_order_and_replace_wholesale() {
    let (source, cmd_tx, mut updates, service) = spawn_service();

    cmd_tx
        .send(FeedCommand::SetEndpoint("http://a/feed".to_string()))
        .unwrap();
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connecting)
    );

    let sub = wait_subscription(&source, 0).await;
    assert_eq!(sub.url, "http://a/feed");

    emit(&sub, SourceEvent::Opened);
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connected)
    );

    emit(&sub, message(ALLOC_PAYLOAD));
    match next_update(&mut updates).await {
        FeedUpdate::Snapshot(snapshot) => {
            assert_eq!(snapshot.len(), 1);
            assert_eq!(snapshot.allocations()[0].index, "0G39");
        }
        other => panic!("unexpected update: {other:?}"),
    }

    // The empty list replaces everything; nothing survives the previous
    // snapshot.
    emit(&sub, message("[]"));
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Snapshot(Snapshot::empty())
    );

    shutdown(cmd_tx, service).await;
}

#[tokio::test(start_paused = true)]
async fn malformed_payload_is_dropped_without_disturbing_state() {
    let (source, cmd_tx, mut updates, service) = spawn_service();

    cmd_tx
        .send(FeedCommand::SetEndpoint("http://a/feed".to_string()))
        .unwrap();
    let sub = wait_subscription(&source, 0).await;
    emit(&sub, SourceEvent::Opened);

    // Malformed body, then a schema mismatch, then a valid update. The first
    // update after Connected must be the valid snapshot: the bad messages
    // produced nothing at all.
    emit(&sub, message("not json"));
    emit(&sub, message(r#"[{"index":"missing fields"}]"#));
    emit(&sub, message(ALLOC_PAYLOAD));

    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connecting)
    );
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connected)
    );
    match next_update(&mut updates).await {
        FeedUpdate::Snapshot(snapshot) => assert_eq!(snapshot.allocations()[0].index, "0G39"),
        other => panic!("expected the valid snapshot, got {other:?}"),
    }

    shutdown(cmd_tx, service).await;
}

#[tokio::test(start_paused = true)]
async fn events_with_other_names_are_ignored() {
    let (source, cmd_tx, mut updates, service) = spawn_service();

    cmd_tx
        .send(FeedCommand::SetEndpoint("http://a/feed".to_string()))
        .unwrap();
    let sub = wait_subscription(&source, 0).await;
    emit(&sub, SourceEvent::Opened);

    emit(
        &sub,
        SourceEvent::Message {
            event: "newAlloc".to_string(),
            data: ALLOC_PAYLOAD.to_string(),
        },
    );
    emit(&sub, message("[]"));

    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connecting)
    );
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connected)
    );
    // Only the matching event name produced a snapshot.
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Snapshot(Snapshot::empty())
    );

    shutdown(cmd_tx, service).await;
}

#[tokio::test(start_paused = true)]
async fn backoff_doubles_caps_and_resets_on_open() {
    let (source, cmd_tx, mut updates, service) = spawn_service();

    cmd_tx
        .send(FeedCommand::SetEndpoint("http://a/feed".to_string()))
        .unwrap();
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connecting)
    );

    // Four consecutive failures: 500, 1000, 2000, then clamped at 2000.
    let expected = [500u64, 1000, 2000, 2000];
    for (attempt, expected_ms) in expected.into_iter().enumerate() {
        let sub = wait_subscription(&source, attempt).await;
        emit(&sub, SourceEvent::Closed { reason: "connection refused".to_string() });

        assert_eq!(
            next_update(&mut updates).await,
            FeedUpdate::Status(ConnectionStatus::Retrying {
                delay: Duration::from_millis(expected_ms)
            })
        );
        // The scheduled retry opens the next attempt.
        assert_eq!(
            next_update(&mut updates).await,
            FeedUpdate::Status(ConnectionStatus::Connecting)
        );
    }

    // A successful open resets the schedule: the next failure starts over at
    // the initial delay.
    let sub = wait_subscription(&source, expected.len()).await;
    emit(&sub, SourceEvent::Opened);
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connected)
    );

    emit(&sub, SourceEvent::Closed { reason: "stream ended".to_string() });
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Retrying {
            delay: Duration::from_millis(500)
        })
    );

    shutdown(cmd_tx, service).await;
}

#[tokio::test(start_paused = true)]
async fn stale_subscription_events_never_mutate_state() {
    let (source, cmd_tx, mut updates, service) = spawn_service();

    cmd_tx
        .send(FeedCommand::SetEndpoint("http://a/feed".to_string()))
        .unwrap();
    let old = wait_subscription(&source, 0).await;
    emit(&old, SourceEvent::Opened);
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connecting)
    );
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connected)
    );

    // Switch endpoints, then let the old connection speak up late: a
    // snapshot, a reopen, and a failure. None of them may be applied, and
    // the stale failure must not schedule a retry.
    cmd_tx
        .send(FeedCommand::SetEndpoint("http://b/feed".to_string()))
        .unwrap();
    let new = wait_subscription(&source, 1).await;
    assert_eq!(new.url, "http://b/feed");

    emit(&old, message(ALLOC_PAYLOAD));
    emit(&old, SourceEvent::Opened);
    emit(&old, SourceEvent::Closed { reason: "late failure".to_string() });

    emit(&new, SourceEvent::Opened);
    emit(&new, message("[]"));

    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connecting)
    );
    // Directly Connected then the new endpoint's snapshot: the stale events
    // produced no update in between.
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connected)
    );
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Snapshot(Snapshot::empty())
    );

    // And no retry was scheduled for the stale failure.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(source.count(), 2, "stale Closed must not reopen anything");

    shutdown(cmd_tx, service).await;
}

#[tokio::test(start_paused = true)]
async fn set_endpoint_discards_pending_retry() {
    let (source, cmd_tx, mut updates, service) = spawn_service();

    cmd_tx
        .send(FeedCommand::SetEndpoint("http://a/feed".to_string()))
        .unwrap();
    let sub = wait_subscription(&source, 0).await;
    emit(&sub, SourceEvent::Closed { reason: "connection refused".to_string() });

    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connecting)
    );
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Retrying {
            delay: Duration::from_millis(500)
        })
    );

    // Supersede the endpoint while the retry is pending. The new endpoint
    // connects immediately and the old retry never fires.
    cmd_tx
        .send(FeedCommand::SetEndpoint("http://b/feed".to_string()))
        .unwrap();
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Connecting)
    );
    let new = wait_subscription(&source, 1).await;
    assert_eq!(new.url, "http://b/feed");

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(
        source.count(),
        2,
        "the superseded retry must not open another subscription"
    );

    // Backoff was reset by the endpoint switch as well.
    emit(&new, SourceEvent::Closed { reason: "connection refused".to_string() });
    assert_eq!(
        next_update(&mut updates).await,
        FeedUpdate::Status(ConnectionStatus::Retrying {
            delay: Duration::from_millis(500)
        })
    );

    shutdown(cmd_tx, service).await;
}
