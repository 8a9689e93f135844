use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

use crate::calendar::CourtesyEvent;
use crate::sync::identity::Identity;
use crate::sync::store::EventStore;
use crate::sync::sync_engine::StoreClient;

/// Live, ordered list of one user's events.
///
/// A background task re-reads the whole list after every local write, on
/// each poll tick and on [`LiveEvents::refresh`]. Every delivery is the
/// complete snapshot; consumers replace what they hold. Dropping the value
/// stops the task.
pub struct LiveEvents {
    identity: Identity,
    receiver: watch::Receiver<Vec<CourtesyEvent>>,
    failures: watch::Receiver<Option<String>>,
    changes: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl LiveEvents {
    pub fn spawn(
        store: Arc<dyn EventStore>,
        identity: Identity,
        changes: Arc<Notify>,
        poll_interval: Duration,
    ) -> Self {
        let (sender, receiver) = watch::channel(Vec::new());
        let (failure_sender, failures) = watch::channel(None);
        let task_identity = identity.clone();
        let task_changes = Arc::clone(&changes);

        let handle = tokio::spawn(async move {
            loop {
                match store.list(&task_identity).await {
                    Ok(events) => {
                        tracing::debug!("Delivering {} events for {}", events.len(), task_identity.uid);
                        failure_sender.send_if_modified(|failure| failure.take().is_some());
                        if sender.send(events).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to load events: {}", e);
                        failure_sender.send_replace(Some(e.to_string()));
                    }
                }

                tokio::select! {
                    _ = task_changes.notified() => {}
                    _ = tokio::time::sleep(poll_interval) => {}
                }
            }
        });

        tracing::info!("Subscribed to events of {}", identity.uid);

        Self {
            identity,
            receiver,
            failures,
            changes,
            handle,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// True when a snapshot arrived that [`LiveEvents::latest`] has not returned yet.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    pub fn latest(&mut self) -> Vec<CourtesyEvent> {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for the next snapshot.
    pub async fn next(&mut self) -> Option<Vec<CourtesyEvent>> {
        self.receiver.changed().await.ok()?;
        Some(self.latest())
    }

    /// The read failure not yet reported, if the last read failed.
    pub fn take_failure(&mut self) -> Option<String> {
        if !self.failures.has_changed().unwrap_or(false) {
            return None;
        }
        self.failures.borrow_and_update().clone()
    }

    pub fn refresh(&self) {
        self.changes.notify_one();
    }
}

impl Drop for LiveEvents {
    fn drop(&mut self) {
        tracing::debug!("Unsubscribing events of {}", self.identity.uid);
        self.handle.abort();
    }
}

/// What a [`LiveFeed`] has for the screen since it was last polled.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    Events(Vec<CourtesyEvent>),
    SignedOut,
    Failed(String),
}

/// Keeps exactly one [`LiveEvents`] for whoever the client is signed in as.
///
/// The subscription is replaced when the identity changes and dropped when
/// it goes away.
pub struct LiveFeed {
    client: StoreClient,
    poll_interval: Duration,
    live: Option<LiveEvents>,
}

impl LiveFeed {
    pub fn new(client: StoreClient, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
            live: None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.live.as_ref().map(LiveEvents::identity)
    }

    pub fn is_subscribed(&self) -> bool {
        self.live.is_some()
    }

    /// Follows the client's identity and returns at most one pending update.
    pub fn poll(&mut self) -> Option<FeedUpdate> {
        let current = self.client.identity();
        if current.as_ref() != self.identity() {
            self.live = None;
            self.live = self.client.spawn_live(self.poll_interval);
            if self.live.is_none() {
                return Some(FeedUpdate::SignedOut);
            }
        }

        let live = self.live.as_mut()?;
        if live.has_changed() {
            return Some(FeedUpdate::Events(live.latest()));
        }
        live.take_failure().map(FeedUpdate::Failed)
    }

    /// Forces a re-read. False when nobody is signed in.
    pub fn refresh(&self) -> bool {
        match &self.live {
            Some(live) => {
                live.refresh();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{EventDraft, EventType};
    use crate::storage::cache::SqliteStore;
    use crate::sync::identity::{IdentityClient, MockIdentityProvider, Session};
    use crate::sync::store::{MockEventStore, StoreError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);
    const SLOW_POLL: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn delivers_initial_snapshot() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let alice = Identity::new("alice");
        store
            .create(&alice, "e1", &EventDraft::new("ACME", EventType::Wedding, "2024-05-10"))
            .await
            .unwrap();

        let mut live = LiveEvents::spawn(store, alice, Arc::new(Notify::new()), SLOW_POLL);
        let events = timeout(WAIT, live.next()).await.unwrap().unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].company_name, "ACME");
    }

    #[tokio::test]
    async fn refresh_redelivers_the_whole_list() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let alice = Identity::new("alice");
        let mut live = LiveEvents::spawn(store.clone(), alice.clone(), Arc::new(Notify::new()), SLOW_POLL);
        let first = timeout(WAIT, live.next()).await.unwrap().unwrap();
        assert!(first.is_empty());

        store
            .create(&alice, "e2", &EventDraft::new("B", EventType::Funeral, "2024-06-01"))
            .await
            .unwrap();
        store
            .create(&alice, "e1", &EventDraft::new("A", EventType::Opening, "2024-05-01"))
            .await
            .unwrap();
        live.refresh();

        let second = timeout(WAIT, live.next()).await.unwrap().unwrap();
        let ids: Vec<&str> = second.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn poll_tick_picks_up_outside_writes() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let alice = Identity::new("alice");
        let mut live = LiveEvents::spawn(
            store.clone(),
            alice.clone(),
            Arc::new(Notify::new()),
            Duration::from_millis(20),
        );
        timeout(WAIT, live.next()).await.unwrap().unwrap();

        store
            .create(&alice, "e1", &EventDraft::new("A", EventType::Other, "2024-05-01"))
            .await
            .unwrap();

        let events = timeout(WAIT, async {
            loop {
                let events = live.next().await.unwrap();
                if !events.is_empty() {
                    return events;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(events[0].id, "e1");
    }

    #[tokio::test]
    async fn read_failure_keeps_previous_snapshot() {
        let mut store = MockEventStore::new();
        store
            .expect_list()
            .returning(|_| Err(StoreError::RequestError("offline".to_string())));

        let mut live = LiveEvents::spawn(
            Arc::new(store),
            Identity::new("alice"),
            Arc::new(Notify::new()),
            Duration::from_millis(10),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!live.has_changed());
        assert_eq!(live.take_failure().as_deref(), Some("Request error: offline"));
        assert_eq!(live.take_failure(), None);
    }

    #[tokio::test]
    async fn dropping_stops_further_reads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let mut store = MockEventStore::new();
        store.expect_list().returning(move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        });

        let changes = Arc::new(Notify::new());
        let mut live = LiveEvents::spawn(Arc::new(store), Identity::new("alice"), Arc::clone(&changes), SLOW_POLL);
        timeout(WAIT, live.next()).await.unwrap().unwrap();
        live.refresh();
        timeout(WAIT, live.next()).await.unwrap().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        drop(live);
        changes.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    fn switching_identity() -> IdentityClient {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in_with_custom_token()
            .returning(|token| Ok(Session::new(token.to_string(), "id".to_string(), "refresh".to_string(), 3600)));
        IdentityClient::new(Arc::new(provider))
    }

    async fn next_update(feed: &mut LiveFeed) -> FeedUpdate {
        timeout(WAIT, async {
            loop {
                if let Some(update) = feed.poll() {
                    return update;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap()
    }

    fn companies(update: FeedUpdate) -> Vec<String> {
        match update {
            FeedUpdate::Events(events) => events.into_iter().map(|e| e.company_name).collect(),
            other => panic!("expected events, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn feed_follows_identity_changes() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let alice = Identity::new("alice");
        let bob = Identity::new("bob");
        store
            .create(&alice, "a1", &EventDraft::new("Alice Corp", EventType::Wedding, "2024-05-10"))
            .await
            .unwrap();
        store
            .create(&bob, "b1", &EventDraft::new("Bob Ltd", EventType::Funeral, "2024-05-11"))
            .await
            .unwrap();

        let identity = switching_identity();
        let client = StoreClient::new(store, identity.subscribe());
        let mut feed = LiveFeed::new(client, SLOW_POLL);
        assert_eq!(feed.poll(), None);
        assert!(!feed.is_subscribed());

        identity.establish_session(Some("alice")).await.unwrap();
        assert_eq!(companies(next_update(&mut feed).await), vec!["Alice Corp"]);
        assert_eq!(feed.identity(), Some(&alice));

        identity.establish_session(Some("bob")).await.unwrap();
        assert_eq!(companies(next_update(&mut feed).await), vec!["Bob Ltd"]);
        assert_eq!(feed.identity(), Some(&bob));

        identity.sign_out().await;
        assert_eq!(next_update(&mut feed).await, FeedUpdate::SignedOut);
        assert!(!feed.is_subscribed());
        assert!(!feed.refresh());
        assert_eq!(feed.poll(), None);
    }

    #[tokio::test]
    async fn feed_reports_read_failures() {
        let mut store = MockEventStore::new();
        store
            .expect_list()
            .returning(|_| Err(StoreError::RequestError("offline".to_string())));
        let (_sender, receiver) = watch::channel(Some(Identity::new("alice")));
        let mut feed = LiveFeed::new(StoreClient::new(Arc::new(store), receiver), SLOW_POLL);

        assert_eq!(
            next_update(&mut feed).await,
            FeedUpdate::Failed("Request error: offline".to_string())
        );
        assert!(feed.is_subscribed());
    }
}
