pub mod calendar;
pub mod input;
pub mod ui;
pub mod sync;
pub mod storage;
pub mod spreadsheet;
pub mod app;

pub use calendar::{Checklist, ChecklistItem, CourtesyEvent, EventDraft, EventType};
pub use app::{AppState, DeleteFlow, Mode, SyncStatus};

pub use input::{normal_mode, command_mode, insert_mode};
