use chrono::{Days, Local};
use crossterm::event::KeyCode;

use crate::app::{AppState, Mode};
use crate::calendar::ChecklistItem;

pub fn handle_key(key: KeyCode, state: &mut AppState) {
    match key {
        KeyCode::Char('h') | KeyCode::Left => move_previous_day(state),
        KeyCode::Char('l') | KeyCode::Right => move_next_day(state),
        KeyCode::Char('j') | KeyCode::Down => {
            if has_events_on_selected_date(state) {
                state.move_event_selection_down();
            } else {
                move_down_week(state);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if has_events_on_selected_date(state) {
                state.move_event_selection_up();
            } else {
                move_up_week(state);
            }
        }
        KeyCode::Char('J') => move_down_week(state),
        KeyCode::Char('K') => move_up_week(state),
        KeyCode::Char('t') => jump_to_today(state),
        KeyCode::Char('a') => state.open_event_form(String::new()),
        KeyCode::Char('x') => request_delete(state),
        KeyCode::Char(':') => enter_command_mode(state),
        KeyCode::Char('?') => show_help(state),
        KeyCode::Char('g') => move_to_start_of_month(state),
        KeyCode::Char('G') => move_to_end_of_month(state),
        KeyCode::Char('{') => state.step_month(-1),
        KeyCode::Char('}') => state.step_month(1),
        _ => {}
    }
}

/// Keys that toggle a checklist item of the selected event.
pub fn checklist_key(key: KeyCode) -> Option<ChecklistItem> {
    match key {
        KeyCode::Char('1') => Some(ChecklistItem::Wreath),
        KeyCode::Char('2') => Some(ChecklistItem::Money),
        KeyCode::Char('3') => Some(ChecklistItem::Telegram),
        _ => None,
    }
}

fn has_events_on_selected_date(state: &AppState) -> bool {
    !state.events_for_selected_day().is_empty()
}

fn move_previous_day(state: &mut AppState) {
    if let Some(new_date) = state.selected_date.checked_sub_days(Days::new(1)) {
        state.select_date(new_date);
    }
}

fn move_next_day(state: &mut AppState) {
    if let Some(new_date) = state.selected_date.checked_add_days(Days::new(1)) {
        state.select_date(new_date);
    }
}

fn move_down_week(state: &mut AppState) {
    if let Some(new_date) = state.selected_date.checked_add_days(Days::new(7)) {
        state.select_date(new_date);
    }
}

fn move_up_week(state: &mut AppState) {
    if let Some(new_date) = state.selected_date.checked_sub_days(Days::new(7)) {
        state.select_date(new_date);
    }
}

fn jump_to_today(state: &mut AppState) {
    state.select_date(Local::now().date_naive());
}

fn request_delete(state: &mut AppState) {
    if !state.request_delete_selected() {
        tracing::debug!("Nothing to delete on {}", state.selected_date);
    }
}

fn enter_command_mode(state: &mut AppState) {
    state.mode = Mode::Command;
    state.command_buffer = ":".to_string();
}

fn show_help(state: &mut AppState) {
    state.show_help = true;
    state.help_scroll = 0;
}

fn move_to_start_of_month(state: &mut AppState) {
    state.select_day(1);
}

fn move_to_end_of_month(state: &mut AppState) {
    let last = state.visible_month.days();
    state.select_day(last);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::DeleteFlow;
    use crate::calendar::{EventDraft, EventType, YearMonth};
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn state_on(y: i32, m: u32, d: u32) -> AppState {
        AppState::starting_at(date(y, m, d))
    }

    fn with_events_on(state: &mut AppState, on: &str, count: usize) {
        let events = (0..count)
            .map(|i| EventDraft::new("ACME", EventType::Wedding, on).into_event(format!("e{}", i), None))
            .collect();
        state.replace_events(events);
    }

    #[test]
    fn h_key_moves_to_previous_day() {
        let mut state = state_on(2025, 1, 15);

        handle_key(KeyCode::Char('h'), &mut state);

        assert_eq!(state.selected_date, date(2025, 1, 14));
    }

    #[test]
    fn l_key_crosses_into_next_month() {
        let mut state = state_on(2025, 1, 31);

        handle_key(KeyCode::Char('l'), &mut state);

        assert_eq!(state.selected_date, date(2025, 2, 1));
        assert_eq!(state.visible_month, YearMonth::new(2025, 2));
    }

    #[test]
    fn j_key_moves_down_one_week_when_no_events() {
        let mut state = state_on(2025, 1, 15);

        handle_key(KeyCode::Char('j'), &mut state);

        assert_eq!(state.selected_date, date(2025, 1, 22));
    }

    #[test]
    fn k_key_moves_up_one_week_when_no_events() {
        let mut state = state_on(2025, 1, 15);

        handle_key(KeyCode::Char('k'), &mut state);

        assert_eq!(state.selected_date, date(2025, 1, 8));
    }

    #[test]
    fn j_key_walks_events_of_the_day() {
        let mut state = state_on(2025, 1, 15);
        with_events_on(&mut state, "2025-01-15", 2);

        handle_key(KeyCode::Char('j'), &mut state);
        handle_key(KeyCode::Char('j'), &mut state);

        assert_eq!(state.selected_date, date(2025, 1, 15));
        assert_eq!(state.selected_event_index, 1);
    }

    #[test]
    fn t_key_jumps_to_today() {
        let mut state = state_on(2020, 1, 1);

        handle_key(KeyCode::Char('t'), &mut state);

        assert_eq!(state.selected_date, Local::now().date_naive());
    }

    #[test]
    fn g_key_moves_to_first_day_of_month() {
        let mut state = state_on(2025, 1, 15);

        handle_key(KeyCode::Char('g'), &mut state);

        assert_eq!(state.selected_date, date(2025, 1, 1));
    }

    #[test]
    fn shift_g_moves_to_last_day_of_month() {
        let mut state = state_on(2024, 2, 15);

        handle_key(KeyCode::Char('G'), &mut state);

        assert_eq!(state.selected_date, date(2024, 2, 29));
    }

    #[test]
    fn braces_step_the_visible_month() {
        let mut state = state_on(2025, 1, 15);

        handle_key(KeyCode::Char('{'), &mut state);
        assert_eq!(state.visible_month, YearMonth::new(2024, 12));
        assert_eq!(state.selected_date, date(2025, 1, 15));

        handle_key(KeyCode::Char('}'), &mut state);
        handle_key(KeyCode::Char('}'), &mut state);
        assert_eq!(state.visible_month, YearMonth::new(2025, 2));
        assert_eq!(state.selected_date, date(2025, 1, 15));
    }

    #[test]
    fn a_key_opens_form_on_selected_date() {
        let mut state = state_on(2025, 1, 15);

        handle_key(KeyCode::Char('a'), &mut state);

        assert_eq!(state.mode, Mode::Insert);
        assert_eq!(state.event_form.as_ref().unwrap().date, "2025-01-15");
    }

    #[test]
    fn x_key_requests_delete_of_selected_event() {
        let mut state = state_on(2025, 1, 15);
        with_events_on(&mut state, "2025-01-15", 1);

        handle_key(KeyCode::Char('x'), &mut state);

        assert_eq!(state.delete_flow, DeleteFlow::PendingDelete("e0".to_string()));
    }

    #[test]
    fn x_key_without_events_stays_idle() {
        let mut state = state_on(2025, 1, 15);

        handle_key(KeyCode::Char('x'), &mut state);

        assert_eq!(state.delete_flow, DeleteFlow::Idle);
    }

    #[test]
    fn colon_enters_command_mode() {
        let mut state = state_on(2025, 1, 15);

        handle_key(KeyCode::Char(':'), &mut state);

        assert_eq!(state.mode, Mode::Command);
        assert_eq!(state.command_buffer, ":");
    }

    #[test]
    fn question_mark_opens_help() {
        let mut state = state_on(2025, 1, 15);

        handle_key(KeyCode::Char('?'), &mut state);

        assert!(state.show_help);
    }

    #[test]
    fn digit_keys_map_to_checklist_items() {
        assert_eq!(checklist_key(KeyCode::Char('1')), Some(ChecklistItem::Wreath));
        assert_eq!(checklist_key(KeyCode::Char('2')), Some(ChecklistItem::Money));
        assert_eq!(checklist_key(KeyCode::Char('3')), Some(ChecklistItem::Telegram));
        assert_eq!(checklist_key(KeyCode::Char('4')), None);
    }
}
