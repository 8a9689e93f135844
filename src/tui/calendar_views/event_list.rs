use chrono::Datelike;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use courtesy_cal::{
    app::AppState,
    calendar::{ChecklistItem, CourtesyEvent},
};

pub fn render(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let events = app.events_for_selected_day();

    let title = format!("{}월 {}일 일정", app.selected_date.month(), app.selected_date.day());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(title, Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
    ];

    if events.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("No events", Style::default().fg(Color::DarkGray)),
        ]));
    } else {
        for (idx, event) in events.iter().enumerate() {
            lines.extend(event_lines(app, event, idx == app.selected_event_index));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(vec![
            Span::styled("j/k", Style::default().fg(Color::Cyan)),
            Span::raw(" = 선택 | "),
            Span::styled("1/2/3", Style::default().fg(Color::Green)),
            Span::raw(" = 체크 | "),
            Span::styled("x", Style::default().fg(Color::Red)),
            Span::raw(" = 삭제"),
        ]));
    }

    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(content, area);
}

fn event_lines<'a>(app: &AppState, event: &'a CourtesyEvent, is_selected: bool) -> Vec<Line<'a>> {
    let cursor = if is_selected { ">" } else { " " };
    let name_style = if is_selected {
        Style::default().bg(app.theme.selected_bg).fg(app.theme.selected_fg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut header = vec![
        Span::styled(cursor, Style::default().fg(app.theme.selected_bg)),
        Span::styled(
            format!("[{}]", event.event_type.label()),
            Style::default().fg(app.theme.badge(event.event_type)),
        ),
        Span::raw(" "),
        Span::styled(event.company_name.as_str(), name_style),
    ];
    if event.is_completed {
        header.push(Span::styled(" 완료", Style::default().fg(app.theme.completed)));
    }

    let mut checklist = vec![Span::raw("  ")];
    for (n, item) in ChecklistItem::ALL.iter().enumerate() {
        let done = event.checklist.get(*item);
        let mark = if done { "[x]" } else { "[ ]" };
        let color = if done { app.theme.completed } else { Color::DarkGray };
        checklist.push(Span::styled(format!("{}{} {} ", n + 1, mark, item.label()), Style::default().fg(color)));
    }
    checklist.push(Span::styled(
        format!("{}/3", event.done_count()),
        Style::default().fg(app.theme.dot(event.is_completed)),
    ));

    let mut lines = vec![Line::from(header), Line::from(checklist)];
    if !event.note.is_empty() {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(event.note.as_str(), Style::default().fg(Color::Gray)),
        ]));
    }
    lines
}
