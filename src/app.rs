use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::calendar::{CourtesyEvent, EventDraft, EventType, YearMonth, events_on, format_date};
use crate::ui::theme::Theme;

static DATE_RE: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    Insert,
    Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Connecting,
    Live,
    Offline,
    SignedOut,
    Error(String),
}

/// Delete confirmation: a request parks the id until it is confirmed or
/// cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteFlow {
    #[default]
    Idle,
    PendingDelete(String),
}

impl DeleteFlow {
    /// Ignored while another delete is pending.
    pub fn request(&mut self, id: impl Into<String>) -> bool {
        match self {
            DeleteFlow::Idle => {
                *self = DeleteFlow::PendingDelete(id.into());
                true
            }
            DeleteFlow::PendingDelete(_) => false,
        }
    }

    /// Returns the id to delete.
    pub fn confirm(&mut self) -> Option<String> {
        match std::mem::take(self) {
            DeleteFlow::PendingDelete(id) => Some(id),
            DeleteFlow::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = DeleteFlow::Idle;
    }

    pub fn pending(&self) -> Option<&str> {
        match self {
            DeleteFlow::PendingDelete(id) => Some(id),
            DeleteFlow::Idle => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("회사명을 입력하세요")]
    MissingCompany,
    #[error("날짜를 입력하세요")]
    MissingDate,
    #[error("날짜 형식이 올바르지 않습니다: {0} (YYYY-MM-DD)")]
    InvalidDate(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Company,
    EventType,
    Date,
    Note,
}

/// Buffer of the add-event modal.
#[derive(Debug, Clone, PartialEq)]
pub struct EventForm {
    pub company_name: String,
    pub event_type: EventType,
    pub date: String,
    pub note: String,
    pub active_field: FormField,
    pub error: Option<FormError>,
}

impl EventForm {
    pub fn new(date: NaiveDate, company_name: String) -> Self {
        Self {
            company_name,
            event_type: EventType::default(),
            date: format_date(date),
            note: String::new(),
            active_field: FormField::Company,
            error: None,
        }
    }

    /// Back to defaults, keeping only the date.
    pub fn reset(&mut self, date: NaiveDate) {
        *self = Self::new(date, String::new());
    }

    pub fn next_field(&mut self) {
        self.active_field = match self.active_field {
            FormField::Company => FormField::EventType,
            FormField::EventType => FormField::Date,
            FormField::Date => FormField::Note,
            FormField::Note => FormField::Company,
        };
    }

    pub fn prev_field(&mut self) {
        self.active_field = match self.active_field {
            FormField::Company => FormField::Note,
            FormField::EventType => FormField::Company,
            FormField::Date => FormField::EventType,
            FormField::Note => FormField::Date,
        };
    }

    pub fn active_text_mut(&mut self) -> Option<&mut String> {
        match self.active_field {
            FormField::Company => Some(&mut self.company_name),
            FormField::Date => Some(&mut self.date),
            FormField::Note => Some(&mut self.note),
            FormField::EventType => None,
        }
    }

    pub fn to_draft(&self) -> Result<EventDraft, FormError> {
        let company = self.company_name.trim();
        if company.is_empty() {
            return Err(FormError::MissingCompany);
        }

        let date = self.date.trim();
        if date.is_empty() {
            return Err(FormError::MissingDate);
        }
        if !is_iso_date(date) {
            return Err(FormError::InvalidDate(date.to_string()));
        }

        Ok(EventDraft::new(company, self.event_type, date).with_note(self.note.trim()))
    }
}

/// Zero-padded `YYYY-MM-DD` naming a real day.
pub fn is_iso_date(text: &str) -> bool {
    let re = DATE_RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid date regex")
    });
    re.is_match(text) && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

pub struct AppState {
    pub mode: Mode,
    pub selected_date: NaiveDate,
    pub visible_month: YearMonth,
    pub events: Vec<CourtesyEvent>,
    pub sync_status: SyncStatus,
    pub status_message: Option<String>,
    pub command_buffer: String,
    pub show_help: bool,
    pub help_scroll: usize,
    pub theme: Theme,
    pub event_form: Option<EventForm>,
    pub selected_event_index: usize,
    pub delete_flow: DeleteFlow,
}

impl AppState {
    pub fn new() -> Self {
        Self::starting_at(Local::now().date_naive())
    }

    pub fn starting_at(date: NaiveDate) -> Self {
        Self {
            mode: Mode::Normal,
            selected_date: date,
            visible_month: YearMonth::of(date),
            events: Vec::new(),
            sync_status: SyncStatus::Connecting,
            status_message: None,
            command_buffer: String::new(),
            show_help: false,
            help_scroll: 0,
            theme: Theme::default(),
            event_form: None,
            selected_event_index: 0,
            delete_flow: DeleteFlow::Idle,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Installs a complete snapshot from the subscription.
    pub fn replace_events(&mut self, events: Vec<CourtesyEvent>) {
        self.events = events;
        let count = self.events_for_selected_day().len();
        if self.selected_event_index >= count {
            self.selected_event_index = count.saturating_sub(1);
        }
    }

    pub fn events_for_selected_day(&self) -> Vec<&CourtesyEvent> {
        events_on(&self.events, &format_date(self.selected_date))
    }

    pub fn selected_event(&self) -> Option<&CourtesyEvent> {
        self.events_for_selected_day()
            .get(self.selected_event_index)
            .copied()
    }

    pub fn find_event(&self, id: &str) -> Option<&CourtesyEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Moves the selection; the visible month follows it.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        if !self.visible_month.contains(date) {
            self.visible_month = YearMonth::of(date);
        }
        self.reset_event_selection();
    }

    /// Selects a day number inside the visible month.
    pub fn select_day(&mut self, day: u32) -> bool {
        match self.visible_month.day(day) {
            Some(date) => {
                self.select_date(date);
                true
            }
            None => false,
        }
    }

    /// Pages the grid only; the selected day and its event list stay put.
    pub fn step_month(&mut self, delta: i32) {
        self.visible_month = self.visible_month.step(delta);
    }

    pub fn move_event_selection_down(&mut self) {
        let event_count = self.events_for_selected_day().len();
        if event_count > 0 && self.selected_event_index < event_count - 1 {
            self.selected_event_index += 1;
        }
    }

    pub fn move_event_selection_up(&mut self) {
        if self.selected_event_index > 0 {
            self.selected_event_index -= 1;
        }
    }

    pub fn reset_event_selection(&mut self) {
        self.selected_event_index = 0;
    }

    pub fn open_event_form(&mut self, company_name: String) {
        self.event_form = Some(EventForm::new(self.selected_date, company_name));
        self.mode = Mode::Insert;
    }

    pub fn close_event_form(&mut self) {
        self.event_form = None;
        self.mode = Mode::Normal;
    }

    pub fn request_delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_event().map(|e| e.id.clone()) else {
            return false;
        };
        self.delete_flow.request(id)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Checklist, EventDraft};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_event(id: &str, company: &str, on: &str) -> CourtesyEvent {
        EventDraft::new(company, EventType::Wedding, on).into_event(id.to_string(), None)
    }

    #[test]
    fn new_app_starts_in_normal_mode() {
        let app = AppState::new();
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.delete_flow, DeleteFlow::Idle);
        assert_eq!(app.sync_status, SyncStatus::Connecting);
    }

    #[test]
    fn new_app_selects_today() {
        let app = AppState::new();
        assert_eq!(app.selected_date, Local::now().date_naive());
        assert!(app.visible_month.contains(app.selected_date));
    }

    #[test]
    fn delete_request_then_cancel_returns_to_idle() {
        let mut flow = DeleteFlow::default();

        assert!(flow.request("e1"));
        assert_eq!(flow.pending(), Some("e1"));
        flow.cancel();

        assert_eq!(flow, DeleteFlow::Idle);
        assert_eq!(flow.confirm(), None);
    }

    #[test]
    fn delete_confirm_yields_the_id_once() {
        let mut flow = DeleteFlow::default();
        flow.request("e1");

        assert_eq!(flow.confirm(), Some("e1".to_string()));
        assert_eq!(flow, DeleteFlow::Idle);
        assert_eq!(flow.confirm(), None);
    }

    #[test]
    fn second_request_while_pending_is_ignored() {
        let mut flow = DeleteFlow::default();
        flow.request("e1");

        assert!(!flow.request("e2"));
        assert_eq!(flow.pending(), Some("e1"));
    }

    #[test]
    fn form_prefills_selected_date_and_default_type() {
        let form = EventForm::new(date(2024, 5, 3), String::new());

        assert_eq!(form.date, "2024-05-03");
        assert_eq!(form.event_type, EventType::Wedding);
        assert_eq!(form.active_field, FormField::Company);
    }

    #[test]
    fn form_requires_company_and_date() {
        let mut form = EventForm::new(date(2024, 5, 3), "  ".to_string());
        assert_eq!(form.to_draft(), Err(FormError::MissingCompany));

        form.company_name = "ACME".to_string();
        form.date.clear();
        assert_eq!(form.to_draft(), Err(FormError::MissingDate));
    }

    #[test]
    fn form_rejects_unpadded_or_impossible_dates() {
        let mut form = EventForm::new(date(2024, 5, 3), "ACME".to_string());

        form.date = "2024-5-3".to_string();
        assert!(matches!(form.to_draft(), Err(FormError::InvalidDate(_))));

        form.date = "2023-02-29".to_string();
        assert!(matches!(form.to_draft(), Err(FormError::InvalidDate(_))));
    }

    #[test]
    fn form_builds_a_draft() {
        let mut form = EventForm::new(date(2024, 5, 10), "ACME".to_string());
        form.event_type = EventType::Opening;
        form.note = "축하 화환".to_string();

        let draft = form.to_draft().unwrap();

        assert_eq!(draft.company_name, "ACME");
        assert_eq!(draft.event_type, EventType::Opening);
        assert_eq!(draft.date, "2024-05-10");
        assert_eq!(draft.note, "축하 화환");
        assert_eq!(draft.checklist, Checklist::default());
        assert_eq!(draft.is_completed, None);
    }

    #[test]
    fn form_reset_keeps_only_the_date() {
        let mut form = EventForm::new(date(2024, 5, 10), "ACME".to_string());
        form.event_type = EventType::Funeral;
        form.note = "x".to_string();

        form.reset(date(2024, 6, 1));

        assert_eq!(form, EventForm::new(date(2024, 6, 1), String::new()));
    }

    #[test]
    fn form_field_cycle_wraps() {
        let mut form = EventForm::new(date(2024, 5, 10), String::new());
        form.prev_field();
        assert_eq!(form.active_field, FormField::Note);
        form.next_field();
        form.next_field();
        assert_eq!(form.active_field, FormField::EventType);
        assert!(form.active_text_mut().is_none());
    }

    #[test]
    fn selected_day_view_filters_by_date_string() {
        let mut app = AppState::starting_at(date(2024, 5, 10));
        app.replace_events(vec![
            create_event("e1", "A", "2024-05-10"),
            create_event("e2", "B", "2024-05-11"),
            create_event("e3", "C", "2024-05-10"),
        ]);

        let ids: Vec<&str> = app.events_for_selected_day().iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["e1", "e3"]);
    }

    #[test]
    fn replace_events_clamps_event_selection() {
        let mut app = AppState::starting_at(date(2024, 5, 10));
        app.replace_events(vec![
            create_event("e1", "A", "2024-05-10"),
            create_event("e2", "B", "2024-05-10"),
        ]);
        app.move_event_selection_down();
        assert_eq!(app.selected_event().unwrap().id, "e2");

        app.replace_events(vec![create_event("e1", "A", "2024-05-10")]);

        assert_eq!(app.selected_event_index, 0);
        assert_eq!(app.selected_event().unwrap().id, "e1");
    }

    #[test]
    fn selecting_a_date_in_another_month_moves_the_view() {
        let mut app = AppState::starting_at(date(2024, 5, 31));

        app.select_date(date(2024, 6, 1));

        assert_eq!(app.visible_month, YearMonth::new(2024, 6));
    }

    #[test]
    fn step_month_keeps_the_selected_day() {
        let mut app = AppState::starting_at(date(2024, 5, 10));
        app.replace_events(vec![create_event("e1", "A", "2024-05-10")]);

        app.step_month(1);

        assert_eq!(app.visible_month, YearMonth::new(2024, 6));
        assert_eq!(app.selected_date, date(2024, 5, 10));
        assert_eq!(app.events_for_selected_day().len(), 1);
    }

    #[test]
    fn step_month_rolls_over_the_year() {
        let mut app = AppState::starting_at(date(2024, 1, 15));

        app.step_month(-1);

        assert_eq!(app.visible_month, YearMonth::new(2023, 12));
        assert_eq!(app.selected_date, date(2024, 1, 15));
    }

    #[test]
    fn select_day_stays_inside_visible_month() {
        let mut app = AppState::starting_at(date(2023, 2, 1));

        assert!(app.select_day(28));
        assert!(!app.select_day(29));
        assert_eq!(app.selected_date, date(2023, 2, 28));
    }

    #[test]
    fn request_delete_uses_selected_event() {
        let mut app = AppState::starting_at(date(2024, 5, 10));
        assert!(!app.request_delete_selected());

        app.replace_events(vec![create_event("e1", "A", "2024-05-10")]);

        assert!(app.request_delete_selected());
        assert_eq!(app.delete_flow.pending(), Some("e1"));
    }
}
