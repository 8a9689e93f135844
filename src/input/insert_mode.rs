use crossterm::event::KeyCode;

use crate::app::{AppState, FormField};

/// Edits the add-event form. Enter and Esc are handled by the session.
pub fn handle_key(key: KeyCode, state: &mut AppState) {
    let Some(form) = state.event_form.as_mut() else {
        return;
    };

    match key {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left if form.active_field == FormField::EventType => {
            form.event_type = form.event_type.prev();
        }
        KeyCode::Right | KeyCode::Char(' ') if form.active_field == FormField::EventType => {
            form.event_type = form.event_type.next();
        }
        KeyCode::Backspace => {
            if let Some(text) = form.active_text_mut() {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if form.active_field == FormField::Date && !(c.is_ascii_digit() || c == '-') {
                return;
            }
            if let Some(text) = form.active_text_mut() {
                text.push(c);
            }
        }
        _ => {}
    }
    form.error = None;
}
