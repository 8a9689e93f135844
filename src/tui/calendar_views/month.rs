use chrono::{Datelike, Local};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use courtesy_cal::{
    app::AppState,
    ui::month_view::{self, DayCell, DayDot},
};

const WEEKDAYS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];
const CELL_WIDTH: usize = 8;

pub fn render(f: &mut Frame, app: &AppState, area: ratatui::layout::Rect) {
    let today = Local::now().date_naive();
    let layout = month_view::calculate_layout(app.visible_month, &app.events, app.selected_date, today);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(layout.month.title(), Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
    ];

    let header: Vec<Span> = WEEKDAYS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let color = if i == 0 { app.theme.sunday } else { app.theme.weekday_header };
            // Hangul is two columns wide.
            Span::styled(format!("  {:<width$}", name, width = CELL_WIDTH - 3), Style::default().fg(color))
        })
        .collect();
    lines.push(Line::from(header));

    for week in &layout.weeks {
        let mut day_spans = Vec::new();
        let mut dot_spans = Vec::new();

        for (weekday, cell) in week.days.iter().enumerate() {
            day_spans.push(day_number(app, cell, weekday == 0));
            dot_spans.extend(dots(app, cell));
        }

        lines.push(Line::from(day_spans));
        lines.push(Line::from(dot_spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("hjkl", Style::default().fg(Color::Cyan)),
        Span::raw(" = 이동 | "),
        Span::styled("{ }", Style::default().fg(Color::Cyan)),
        Span::raw(" = 이전/다음 달 | "),
        Span::styled("a", Style::default().fg(Color::Green)),
        Span::raw(" = 일정 등록 | "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" = 도움말"),
    ]));

    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(content, area);
}

fn day_number<'a>(app: &AppState, cell: &DayCell, is_sunday: bool) -> Span<'a> {
    let Some(date) = cell.date else {
        return Span::raw(" ".repeat(CELL_WIDTH));
    };

    let marker = if cell.is_today { "•" } else { " " };
    let text = format!(" {:>2}{}    ", date.day(), marker);

    let mut style = Style::default();
    if is_sunday {
        style = style.fg(app.theme.sunday);
    }
    if cell.is_today {
        style = style.fg(app.theme.today).add_modifier(Modifier::BOLD);
    }
    if cell.is_selected {
        style = style
            .bg(app.theme.selected_bg)
            .fg(app.theme.selected_fg)
            .add_modifier(Modifier::BOLD);
    }

    Span::styled(text, style)
}

fn dots<'a>(app: &AppState, cell: &DayCell) -> Vec<Span<'a>> {
    let mut spans = vec![Span::raw(" ")];
    let mut used = 1;

    for dot in &cell.dots {
        let color = app.theme.dot(*dot == DayDot::Completed);
        spans.push(Span::styled("●", Style::default().fg(color)));
        used += 1;
    }
    if cell.has_more {
        spans.push(Span::styled("+", Style::default().fg(app.theme.inactive_day)));
        used += 1;
    }

    spans.push(Span::raw(" ".repeat(CELL_WIDTH.saturating_sub(used))));
    spans
}
