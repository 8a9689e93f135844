use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One courtesy occasion for a business contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtesyEvent {
    pub id: String,
    pub company_name: String,
    pub event_type: EventType,
    /// Zero-padded `YYYY-MM-DD`. Filtering and ordering compare this string as-is.
    pub date: String,
    pub note: String,
    pub checklist: Checklist,
    /// Stored alongside the checklist and rewritten on every checklist patch.
    pub is_completed: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl CourtesyEvent {
    pub fn done_count(&self) -> usize {
        self.checklist.done_count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[default]
    Wedding,
    Funeral,
    Opening,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Wedding,
        EventType::Funeral,
        EventType::Opening,
        EventType::Other,
    ];

    /// Label persisted in the store and written to spreadsheets.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Wedding => "결혼",
            EventType::Funeral => "장례",
            EventType::Opening => "개업",
            EventType::Other => "기타",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "결혼" => EventType::Wedding,
            "장례" => EventType::Funeral,
            "개업" => EventType::Opening,
            _ => EventType::Other,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            EventType::Wedding => EventType::Funeral,
            EventType::Funeral => EventType::Opening,
            EventType::Opening => EventType::Other,
            EventType::Other => EventType::Wedding,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            EventType::Wedding => EventType::Other,
            EventType::Funeral => EventType::Wedding,
            EventType::Opening => EventType::Funeral,
            EventType::Other => EventType::Opening,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChecklistItem {
    Wreath,
    Money,
    Telegram,
}

impl ChecklistItem {
    pub const ALL: [ChecklistItem; 3] = [
        ChecklistItem::Wreath,
        ChecklistItem::Money,
        ChecklistItem::Telegram,
    ];

    /// Field name inside the stored `checklist` map.
    pub fn key(&self) -> &'static str {
        match self {
            ChecklistItem::Wreath => "wreath",
            ChecklistItem::Money => "money",
            ChecklistItem::Telegram => "telegram",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChecklistItem::Wreath => "화환",
            ChecklistItem::Money => "경조금",
            ChecklistItem::Telegram => "전보/방문",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.key() == key)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub wreath: bool,
    pub money: bool,
    pub telegram: bool,
}

impl Checklist {
    pub fn get(&self, item: ChecklistItem) -> bool {
        match item {
            ChecklistItem::Wreath => self.wreath,
            ChecklistItem::Money => self.money,
            ChecklistItem::Telegram => self.telegram,
        }
    }

    pub fn set(&mut self, item: ChecklistItem, value: bool) {
        match item {
            ChecklistItem::Wreath => self.wreath = value,
            ChecklistItem::Money => self.money = value,
            ChecklistItem::Telegram => self.telegram = value,
        }
    }

    /// The checklist as it will be once `item` holds `value`.
    pub fn with(mut self, item: ChecklistItem, value: bool) -> Self {
        self.set(item, value);
        self
    }

    pub fn all_done(&self) -> bool {
        self.wreath && self.money && self.telegram
    }

    pub fn done_count(&self) -> usize {
        ChecklistItem::ALL
            .into_iter()
            .filter(|item| self.get(*item))
            .count()
    }
}

/// A record about to be created. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub company_name: String,
    pub event_type: EventType,
    pub date: String,
    pub note: String,
    pub checklist: Checklist,
    /// Only bulk import sets this; interactive creation always starts incomplete.
    pub is_completed: Option<bool>,
}

impl EventDraft {
    pub fn new(company_name: impl Into<String>, event_type: EventType, date: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            event_type,
            date: date.into(),
            ..Self::default()
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_checklist(mut self, checklist: Checklist) -> Self {
        self.checklist = checklist;
        self
    }

    pub fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = Some(is_completed);
        self
    }

    pub fn is_valid(&self) -> bool {
        !self.company_name.is_empty() && !self.date.is_empty()
    }

    pub fn into_event(self, id: String, created_at: Option<DateTime<Utc>>) -> CourtesyEvent {
        let is_completed = self.is_completed.unwrap_or(false);
        CourtesyEvent {
            id,
            company_name: self.company_name,
            event_type: self.event_type,
            date: self.date,
            note: self.note,
            checklist: self.checklist,
            is_completed,
            created_at,
        }
    }
}

/// Events whose `date` string equals `date`, in the order given.
pub fn events_on<'a>(events: &'a [CourtesyEvent], date: &str) -> Vec<&'a CourtesyEvent> {
    events.iter().filter(|event| event.date == date).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_event(id: &str, date: &str) -> CourtesyEvent {
        EventDraft::new(format!("Company {}", id), EventType::Wedding, date)
            .into_event(id.to_string(), None)
    }

    #[test]
    fn default_event_type_is_wedding() {
        assert_eq!(EventType::default(), EventType::Wedding);
    }

    #[test]
    fn event_type_labels_round_trip() {
        for event_type in EventType::ALL {
            assert_eq!(EventType::from_label(event_type.label()), event_type);
        }
    }

    #[test]
    fn unknown_label_maps_to_other() {
        assert_eq!(EventType::from_label("돌잔치"), EventType::Other);
    }

    #[test]
    fn event_type_cycles_through_all_values() {
        let mut t = EventType::Wedding;
        for _ in 0..4 {
            t = t.next();
        }
        assert_eq!(t, EventType::Wedding);
        assert_eq!(EventType::Wedding.prev(), EventType::Other);
    }

    #[test]
    fn checklist_defaults_to_nothing_done() {
        let checklist = Checklist::default();
        assert!(!checklist.all_done());
        assert_eq!(checklist.done_count(), 0);
    }

    #[test]
    fn checklist_with_reflects_the_new_value() {
        let checklist = Checklist { wreath: true, money: true, telegram: false };

        let after = checklist.with(ChecklistItem::Telegram, true);

        assert!(after.all_done());
        assert!(!checklist.all_done());
    }

    #[test]
    fn checklist_keys_parse_back() {
        assert_eq!(ChecklistItem::from_key("money"), Some(ChecklistItem::Money));
        assert_eq!(ChecklistItem::from_key("flowers"), None);
    }

    #[test]
    fn draft_without_company_is_invalid() {
        let draft = EventDraft::new("", EventType::Wedding, "2024-05-10");
        assert!(!draft.is_valid());
    }

    #[test]
    fn draft_without_date_is_invalid() {
        let draft = EventDraft::new("ACME", EventType::Wedding, "");
        assert!(!draft.is_valid());
    }

    #[test]
    fn draft_becomes_incomplete_event_unless_told_otherwise() {
        let event = EventDraft::new("ACME", EventType::Funeral, "2024-05-10")
            .into_event("e1".to_string(), None);
        assert!(!event.is_completed);

        let imported = EventDraft::new("ACME", EventType::Funeral, "2024-05-10")
            .with_completed(true)
            .into_event("e2".to_string(), None);
        assert!(imported.is_completed);
    }

    #[test]
    fn events_on_date_with_no_match_is_empty() {
        let events = vec![create_test_event("a", "2024-05-10")];
        assert!(events_on(&events, "2024-05-11").is_empty());
    }

    proptest! {
        #[test]
        fn completion_after_any_toggle_matches_all_flags(
            wreath: bool,
            money: bool,
            telegram: bool,
            item_idx in 0usize..3,
            value: bool,
        ) {
            let item = ChecklistItem::ALL[item_idx];
            let after = Checklist { wreath, money, telegram }.with(item, value);
            prop_assert_eq!(after.all_done(), after.wreath && after.money && after.telegram);
        }

        #[test]
        fn filtering_returns_exactly_matching_dates(
            days in proptest::collection::vec(1u32..=5, 0..20),
            target in 1u32..=6,
        ) {
            let events: Vec<CourtesyEvent> = days
                .iter()
                .enumerate()
                .map(|(i, day)| create_test_event(&i.to_string(), &format!("2024-05-{:02}", day)))
                .collect();
            let target_str = format!("2024-05-{:02}", target);

            let matched = events_on(&events, &target_str);

            prop_assert_eq!(matched.len(), days.iter().filter(|d| **d == target).count());
            prop_assert!(matched.iter().all(|e| e.date == target_str));
        }
    }
}
