use async_trait::async_trait;
use thiserror::Error;

use crate::calendar::{ChecklistItem, CourtesyEvent, EventDraft};
use crate::sync::identity::Identity;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Event not found: {0}")]
    NotFound(String),
    #[error("Event already exists: {0}")]
    AlreadyExists(String),
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Authentication error: {0}")]
    AuthError(#[from] crate::sync::identity::AuthError),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Backend primitives for one user's event collection.
///
/// Writes return only success or failure; callers observe the resulting
/// records through [`EventStore::list`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Every event of the user, ascending by the `date` string.
    async fn list(&self, identity: &Identity) -> Result<Vec<CourtesyEvent>, StoreError>;

    async fn create(
        &self,
        identity: &Identity,
        id: &str,
        draft: &EventDraft,
    ) -> Result<(), StoreError>;

    /// Writes exactly `checklist.<item>` and `isCompleted`.
    async fn patch_checklist(
        &self,
        identity: &Identity,
        id: &str,
        item: ChecklistItem,
        value: bool,
        is_completed: bool,
    ) -> Result<(), StoreError>;

    async fn delete(&self, identity: &Identity, id: &str) -> Result<(), StoreError>;
}
