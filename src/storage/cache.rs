use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Result as SqliteResult, params};
use std::path::Path;
use tokio::sync::Mutex;

use crate::calendar::{Checklist, ChecklistItem, CourtesyEvent, EventDraft, EventType};
use crate::sync::identity::Identity;
use crate::sync::store::{EventStore, StoreError};

/// Local event store used in offline mode.
///
/// Keeps the same contract as the hosted store: rows are scoped by user,
/// listed ascending by the `date` string, and stamped on insert.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::RequestError(format!("Cannot create {}: {}", parent.display(), e)))?;
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize_blocking()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self::new(Connection::open_in_memory()?);
        store.initialize_blocking()?;
        Ok(store)
    }

    fn initialize_blocking(&self) -> Result<(), StoreError> {
        let conn = self.conn.try_lock()
            .map_err(|_| StoreError::RequestError("Store is busy".to_string()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                uid TEXT NOT NULL,
                id TEXT NOT NULL,
                company_name TEXT NOT NULL,
                event_type TEXT NOT NULL,
                date TEXT NOT NULL,
                note TEXT NOT NULL,
                wreath INTEGER NOT NULL,
                money INTEGER NOT NULL,
                telegram INTEGER NOT NULL,
                is_completed INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (uid, id)
            )",
            [],
        )?;
        Ok(())
    }

    pub async fn table_exists(&self, table_name: &str) -> bool {
        let conn = self.conn.lock().await;
        let result: SqliteResult<i32> = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }

    pub async fn load_event(&self, identity: &Identity, id: &str) -> Result<Option<CourtesyEvent>, StoreError> {
        let conn = self.conn.lock().await;
        let event = conn
            .query_row(
                "SELECT id, company_name, event_type, date, note, wreath, money, telegram, is_completed, created_at
                 FROM events WHERE uid = ?1 AND id = ?2",
                params![identity.uid, id],
                row_to_event,
            )
            .optional()?;
        Ok(event)
    }
}

fn row_to_event(row: &rusqlite::Row<'_>) -> SqliteResult<CourtesyEvent> {
    let event_type: String = row.get(2)?;
    let created_at: String = row.get(9)?;
    Ok(CourtesyEvent {
        id: row.get(0)?,
        company_name: row.get(1)?,
        event_type: EventType::from_label(&event_type),
        date: row.get(3)?,
        note: row.get(4)?,
        checklist: Checklist {
            wreath: row.get(5)?,
            money: row.get(6)?,
            telegram: row.get(7)?,
        },
        is_completed: row.get(8)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
    })
}

fn checklist_column(item: ChecklistItem) -> &'static str {
    match item {
        ChecklistItem::Wreath => "wreath",
        ChecklistItem::Money => "money",
        ChecklistItem::Telegram => "telegram",
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn list(&self, identity: &Identity) -> Result<Vec<CourtesyEvent>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, company_name, event_type, date, note, wreath, money, telegram, is_completed, created_at
             FROM events WHERE uid = ?1 ORDER BY date ASC, rowid ASC",
        )?;
        let events = stmt
            .query_map([&identity.uid], row_to_event)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(events)
    }

    async fn create(
        &self,
        identity: &Identity,
        id: &str,
        draft: &EventDraft,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let result = conn.execute(
            "INSERT INTO events (uid, id, company_name, event_type, date, note, wreath, money, telegram, is_completed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                identity.uid,
                id,
                draft.company_name,
                draft.event_type.label(),
                draft.date,
                draft.note,
                draft.checklist.wreath,
                draft.checklist.money,
                draft.checklist.telegram,
                draft.is_completed.unwrap_or(false),
                Utc::now().to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::AlreadyExists(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn patch_checklist(
        &self,
        identity: &Identity,
        id: &str,
        item: ChecklistItem,
        value: bool,
        is_completed: bool,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "UPDATE events SET {} = ?1, is_completed = ?2 WHERE uid = ?3 AND id = ?4",
            checklist_column(item)
        );
        let changed = conn.execute(&sql, params![value, is_completed, identity.uid, id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, identity: &Identity, id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "DELETE FROM events WHERE uid = ?1 AND id = ?2",
            params![identity.uid, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
