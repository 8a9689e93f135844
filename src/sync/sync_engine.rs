use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};

use crate::calendar::{ChecklistItem, CourtesyEvent, EventDraft};
use crate::sync::identity::Identity;
use crate::sync::store::{EventStore, StoreError};
use crate::sync::subscription::LiveEvents;

/// The event client the UI talks to.
///
/// Every write is gated on the current identity, and every failure is
/// logged and reported only as `false`. Successful writes wake the live
/// subscription, which then delivers a fresh snapshot.
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn EventStore>,
    identity: watch::Receiver<Option<Identity>>,
    changes: Arc<Notify>,
}

impl StoreClient {
    pub fn new(store: Arc<dyn EventStore>, identity: watch::Receiver<Option<Identity>>) -> Self {
        Self {
            store,
            identity,
            changes: Arc::new(Notify::new()),
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    /// One-shot read of the ordered list; empty without an identity.
    pub async fn snapshot(&self) -> Result<Vec<CourtesyEvent>, StoreError> {
        match self.identity() {
            Some(identity) => self.store.list(&identity).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn create(&self, draft: EventDraft) -> bool {
        let Some(identity) = self.identity() else {
            tracing::debug!("Create ignored: no identity");
            return false;
        };
        if !draft.is_valid() {
            tracing::warn!("Create rejected: company name and date are required");
            return false;
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        match self.store.create(&identity, &id, &draft).await {
            Ok(()) => {
                tracing::info!("Created event {} ({} on {})", id, draft.company_name, draft.date);
                self.changes.notify_one();
                true
            }
            Err(e) => {
                tracing::error!("Failed to create event: {}", e);
                false
            }
        }
    }

    /// Flips one checklist item and writes it together with the completion
    /// flag computed from the post-toggle checklist.
    pub async fn toggle_checklist(&self, event: &CourtesyEvent, item: ChecklistItem) -> bool {
        let Some(identity) = self.identity() else {
            tracing::debug!("Toggle ignored: no identity");
            return false;
        };

        let value = !event.checklist.get(item);
        let is_completed = event.checklist.with(item, value).all_done();

        match self
            .store
            .patch_checklist(&identity, &event.id, item, value, is_completed)
            .await
        {
            Ok(()) => {
                tracing::debug!("Set {} = {} on {}", item.key(), value, event.id);
                self.changes.notify_one();
                true
            }
            Err(e) => {
                tracing::error!("Failed to update checklist of {}: {}", event.id, e);
                false
            }
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        let Some(identity) = self.identity() else {
            tracing::debug!("Delete ignored: no identity");
            return false;
        };

        match self.store.delete(&identity, id).await {
            Ok(()) => {
                tracing::info!("Deleted event {}", id);
                self.changes.notify_one();
                true
            }
            Err(e) => {
                tracing::error!("Failed to delete event {}: {}", id, e);
                false
            }
        }
    }

    /// Starts the list subscription for the current identity, if any.
    pub fn spawn_live(&self, poll_interval: Duration) -> Option<LiveEvents> {
        let identity = self.identity()?;
        Some(LiveEvents::spawn(
            Arc::clone(&self.store),
            identity,
            Arc::clone(&self.changes),
            poll_interval,
        ))
    }
}
