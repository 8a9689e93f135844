use chrono::NaiveDate;

use crate::calendar::{Checklist, CourtesyEvent, EventDraft, EventType, format_date};

pub const SHEET_NAME: &str = "경조사목록";

pub const DATE: &str = "날짜";
pub const COMPANY: &str = "회사명";
pub const TYPE: &str = "구분";
pub const WREATH: &str = "화환보냄";
pub const MONEY: &str = "경조금보냄";
pub const TELEGRAM: &str = "전보보냄";
pub const COMPLETION: &str = "완료여부";
pub const NOTE: &str = "메모";

/// Column labels in sheet order.
pub const HEADERS: [&str; 8] = [DATE, COMPANY, TYPE, WREATH, MONEY, TELEGRAM, COMPLETION, NOTE];

pub const UNKNOWN_COMPANY: &str = "Unknown";
pub const DONE_LABEL: &str = "완료";
pub const IN_PROGRESS_LABEL: &str = "진행중";
const FLAG_ON: &str = "O";
const FLAG_OFF: &str = "X";

/// One spreadsheet row keyed by column label. Absent cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    pub date: Option<String>,
    pub company_name: Option<String>,
    pub event_type: Option<String>,
    pub wreath: Option<String>,
    pub money: Option<String>,
    pub telegram: Option<String>,
    pub completion: Option<String>,
    pub note: Option<String>,
}

fn flag(value: bool) -> String {
    if value { FLAG_ON } else { FLAG_OFF }.to_string()
}

fn is_on(cell: &Option<String>) -> bool {
    cell.as_deref() == Some(FLAG_ON)
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.is_empty())
}

/// Rewrites `YYYY-MM-DD`, `YYYY/MM/DD` and `YYYY.MM.DD` to zero-padded
/// `YYYY-MM-DD`. Anything else is returned unchanged.
pub fn normalize_date_text(text: &str) -> String {
    ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text.trim(), fmt).ok())
        .map(format_date)
        .unwrap_or_else(|| text.to_string())
}

impl SheetRow {
    pub fn from_event(event: &CourtesyEvent) -> Self {
        Self {
            date: Some(event.date.clone()),
            company_name: Some(event.company_name.clone()),
            event_type: Some(event.event_type.label().to_string()),
            wreath: Some(flag(event.checklist.wreath)),
            money: Some(flag(event.checklist.money)),
            telegram: Some(flag(event.checklist.telegram)),
            completion: Some(
                if event.is_completed { DONE_LABEL } else { IN_PROGRESS_LABEL }.to_string(),
            ),
            note: Some(event.note.clone()),
        }
    }

    /// Cell text in [`HEADERS`] order.
    pub fn cells(&self) -> [&str; 8] {
        [
            &self.date,
            &self.company_name,
            &self.event_type,
            &self.wreath,
            &self.money,
            &self.telegram,
            &self.completion,
            &self.note,
        ]
        .map(|cell| cell.as_deref().unwrap_or(""))
    }

    /// Sets the cell under `label`; unknown labels are ignored.
    pub fn set(&mut self, label: &str, value: String) {
        let slot = match label {
            DATE => &mut self.date,
            COMPANY => &mut self.company_name,
            TYPE => &mut self.event_type,
            WREATH => &mut self.wreath,
            MONEY => &mut self.money,
            TELEGRAM => &mut self.telegram,
            COMPLETION => &mut self.completion,
            NOTE => &mut self.note,
            _ => return,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        self.cells().iter().all(|c| c.is_empty())
    }

    /// Applies the import defaults for missing cells.
    pub fn into_draft(self, today: NaiveDate) -> EventDraft {
        let checklist = Checklist {
            wreath: is_on(&self.wreath),
            money: is_on(&self.money),
            telegram: is_on(&self.telegram),
        };
        let is_completed = self.completion.as_deref() == Some(DONE_LABEL);

        let date = non_empty(self.date)
            .map(|d| normalize_date_text(&d))
            .unwrap_or_else(|| format_date(today));
        let event_type = non_empty(self.event_type)
            .map(|t| EventType::from_label(&t))
            .unwrap_or(EventType::Other);
        let company = non_empty(self.company_name).unwrap_or_else(|| UNKNOWN_COMPANY.to_string());

        EventDraft::new(company, event_type, date)
            .with_note(self.note.unwrap_or_default())
            .with_checklist(checklist)
            .with_completed(is_completed)
    }
}
