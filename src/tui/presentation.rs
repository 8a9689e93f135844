use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use courtesy_cal::app::{AppState, Mode, SyncStatus};
use crate::tui::{calendar_views, dialogs};

pub fn ui(f: &mut Frame, app: &AppState) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(main_chunks[1]);

    let title_text = format!(
        "경조사 매니저 - Secretary Mate - {} ({} 건)",
        app.visible_month.title(),
        app.events.len()
    );

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, main_chunks[0]);

    calendar_views::month::render(f, app, content_chunks[0]);
    calendar_views::event_list::render(f, app, content_chunks[1]);

    let (status_text, status_color) = status_line(app);
    let status = Paragraph::new(status_text)
        .style(Style::default().fg(status_color))
        .alignment(if matches!(app.mode, Mode::Command) { Alignment::Left } else { Alignment::Center })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, main_chunks[2]);

    if app.show_help {
        dialogs::help::render(f, app);
    }

    if app.event_form.is_some() {
        dialogs::event_form::render(f, app);
    }

    if app.delete_flow.pending().is_some() {
        dialogs::delete_confirmation::render(f, app);
    }
}

fn status_line(app: &AppState) -> (String, ratatui::style::Color) {
    if matches!(app.mode, Mode::Command) {
        return (app.command_buffer.clone(), app.theme.status_bar);
    }

    let (sync_label, color) = match &app.sync_status {
        SyncStatus::Connecting => ("Connecting...".to_string(), app.theme.inactive_day),
        SyncStatus::Live => ("Live".to_string(), app.theme.success),
        SyncStatus::Offline => ("Offline store".to_string(), app.theme.success),
        SyncStatus::SignedOut => ("Not signed in".to_string(), app.theme.error),
        SyncStatus::Error(message) => (message.clone(), app.theme.error),
    };

    let text = match &app.status_message {
        Some(message) => format!("{} | {}", message, sync_label),
        None => format!("{} | Press 'q' to quit, '?' for help", sync_label),
    };
    (text, if app.status_message.is_some() { app.theme.status_bar } else { color })
}
