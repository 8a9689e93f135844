use chrono::NaiveDate;
use std::collections::HashMap;

use crate::calendar::{CourtesyEvent, YearMonth, format_date};

pub const MAX_DOTS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthLayout {
    pub month: YearMonth,
    pub weeks: Vec<Week>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Week {
    pub days: Vec<DayCell>,
}

/// Status marker of one event in a day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayDot {
    Completed,
    InProgress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    /// `None` for the padding cells before the 1st and after the last day.
    pub date: Option<NaiveDate>,
    pub is_selected: bool,
    pub is_today: bool,
    pub dots: Vec<DayDot>,
    pub has_more: bool,
}

impl DayCell {
    pub fn blank() -> Self {
        Self::new(None)
    }

    pub fn new(date: Option<NaiveDate>) -> Self {
        Self {
            date,
            is_selected: false,
            is_today: false,
            dots: Vec::new(),
            has_more: false,
        }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.is_selected = selected;
        self
    }

    pub fn with_today(mut self, today: bool) -> Self {
        self.is_today = today;
        self
    }

    pub fn with_events(mut self, events: &[&CourtesyEvent]) -> Self {
        self.dots = events
            .iter()
            .take(MAX_DOTS)
            .map(|e| if e.is_completed { DayDot::Completed } else { DayDot::InProgress })
            .collect();
        self.has_more = events.len() > MAX_DOTS;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.date.is_none()
    }
}

/// Sunday-first grid of `month`.
pub fn calculate_layout(
    month: YearMonth,
    events: &[CourtesyEvent],
    selected: NaiveDate,
    today: NaiveDate,
) -> MonthLayout {
    let mut by_date: HashMap<&str, Vec<&CourtesyEvent>> = HashMap::new();
    for event in events {
        by_date.entry(event.date.as_str()).or_default().push(event);
    }

    let mut cells: Vec<DayCell> = (0..month.first_weekday()).map(|_| DayCell::blank()).collect();

    for day in 1..=month.days() {
        let Some(date) = month.day(day) else { break };
        let key = format_date(date);
        let day_events = by_date.get(key.as_str()).map(Vec::as_slice).unwrap_or(&[]);

        cells.push(
            DayCell::new(Some(date))
                .with_selected(date == selected)
                .with_today(date == today)
                .with_events(day_events),
        );
    }

    while cells.len() % 7 != 0 {
        cells.push(DayCell::blank());
    }

    let weeks = cells
        .chunks(7)
        .map(|days| Week { days: days.to_vec() })
        .collect();

    MonthLayout { month, weeks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Checklist, EventDraft, EventType};
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn create_event_on(id: &str, on: &str, completed: bool) -> CourtesyEvent {
        let checklist = if completed {
            Checklist { wreath: true, money: true, telegram: true }
        } else {
            Checklist::default()
        };
        EventDraft::new("ACME", EventType::Wedding, on)
            .with_checklist(checklist)
            .with_completed(completed)
            .into_event(id.to_string(), None)
    }

    fn cell(layout: &MonthLayout, on: NaiveDate) -> &DayCell {
        layout
            .weeks
            .iter()
            .flat_map(|w| &w.days)
            .find(|c| c.date == Some(on))
            .unwrap()
    }

    #[test]
    fn leading_blanks_match_first_weekday() {
        // 2024-05-01 is a Wednesday.
        let layout = calculate_layout(YearMonth::new(2024, 5), &[], date(2024, 5, 1), date(2024, 5, 1));

        let first_week = &layout.weeks[0];
        assert!(first_week.days[..3].iter().all(DayCell::is_blank));
        assert_eq!(first_week.days[3].date, Some(date(2024, 5, 1)));
    }

    #[test]
    fn month_starting_on_sunday_has_no_leading_blanks() {
        // 2023-10-01 is a Sunday.
        let layout = calculate_layout(YearMonth::new(2023, 10), &[], date(2023, 10, 1), date(2023, 10, 1));

        assert_eq!(layout.weeks[0].days[0].date, Some(date(2023, 10, 1)));
    }

    #[test]
    fn each_week_has_seven_days() {
        let layout = calculate_layout(YearMonth::new(2024, 2), &[], date(2024, 2, 1), date(2024, 2, 1));

        for week in &layout.weeks {
            assert_eq!(week.days.len(), 7);
        }
        let days = layout.weeks.iter().flat_map(|w| &w.days).filter(|c| !c.is_blank()).count();
        assert_eq!(days, 29);
    }

    #[test]
    fn selected_and_today_are_marked_once() {
        let layout = calculate_layout(YearMonth::new(2025, 1), &[], date(2025, 1, 15), date(2025, 1, 3));

        let selected: Vec<_> = layout.weeks.iter().flat_map(|w| &w.days).filter(|c| c.is_selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].date, Some(date(2025, 1, 15)));
        assert!(cell(&layout, date(2025, 1, 3)).is_today);
    }

    #[test]
    fn today_outside_visible_month_is_not_marked() {
        let layout = calculate_layout(YearMonth::new(2025, 1), &[], date(2025, 1, 15), date(2025, 2, 3));

        assert!(layout.weeks.iter().flat_map(|w| &w.days).all(|c| !c.is_today));
    }

    #[test]
    fn dots_follow_completion_in_list_order() {
        let events = vec![
            create_event_on("e1", "2024-05-10", true),
            create_event_on("e2", "2024-05-10", false),
        ];

        let layout = calculate_layout(YearMonth::new(2024, 5), &events, date(2024, 5, 1), date(2024, 5, 1));

        let day = cell(&layout, date(2024, 5, 10));
        assert_eq!(day.dots, vec![DayDot::Completed, DayDot::InProgress]);
        assert!(!day.has_more);
        assert!(cell(&layout, date(2024, 5, 11)).dots.is_empty());
    }

    #[test]
    fn more_than_three_events_show_overflow() {
        let events: Vec<_> = (0..5)
            .map(|i| create_event_on(&format!("e{}", i), "2024-05-10", false))
            .collect();

        let layout = calculate_layout(YearMonth::new(2024, 5), &events, date(2024, 5, 1), date(2024, 5, 1));

        let day = cell(&layout, date(2024, 5, 10));
        assert_eq!(day.dots.len(), MAX_DOTS);
        assert!(day.has_more);
    }

    #[test]
    fn unpadded_dates_do_not_match_any_cell() {
        let events = vec![create_event_on("e1", "2024-5-10", false)];

        let layout = calculate_layout(YearMonth::new(2024, 5), &events, date(2024, 5, 1), date(2024, 5, 1));

        assert!(layout.weeks.iter().flat_map(|w| &w.days).all(|c| c.dots.is_empty()));
    }
}
