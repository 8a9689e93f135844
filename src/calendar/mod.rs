pub mod event;
pub mod month;

pub use event::{Checklist, ChecklistItem, CourtesyEvent, EventDraft, EventType, events_on};
pub use month::{YearMonth, days_in_month, first_weekday, format_date};
