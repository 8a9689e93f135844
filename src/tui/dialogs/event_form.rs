use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use courtesy_cal::{
    app::{AppState, FormField},
    calendar::EventType,
};

pub fn render(f: &mut Frame, app: &AppState) {
    let Some(form) = &app.event_form else {
        return;
    };

    let area = f.size();
    let form_width = 64.min(area.width);
    let form_height = 15.min(area.height);
    let x = (area.width.saturating_sub(form_width)) / 2;
    let y = (area.height.saturating_sub(form_height)) / 2;

    let form_area = ratatui::layout::Rect {
        x,
        y,
        width: form_width,
        height: form_height,
    };

    f.render_widget(Clear, form_area);

    let active_color = app.theme.selected_bg;
    let inactive_color = Color::DarkGray;
    let label = |text: &'static str, field: FormField| {
        let color = if form.active_field == field { active_color } else { inactive_color };
        Span::styled(text, Style::default().fg(color))
    };

    let type_spans: Vec<Span> = EventType::ALL
        .iter()
        .flat_map(|t| {
            let style = if *t == form.event_type {
                Style::default().fg(app.theme.badge(*t)).add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(app.theme.badge(*t))
            };
            [Span::styled(format!(" {} ", t.label()), style), Span::raw(" ")]
        })
        .collect();

    let mut type_line = vec![label("구분:    ", FormField::EventType)];
    type_line.extend(type_spans);

    let mut form_text = vec![
        Line::from(vec![Span::styled("새 경조사 등록", Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))]),
        Line::from(""),
        Line::from(vec![label("회사명:  ", FormField::Company), Span::raw(form.company_name.as_str())]),
        Line::from(""),
        Line::from(type_line),
        Line::from(""),
        Line::from(vec![
            label("날짜:    ", FormField::Date),
            Span::raw(form.date.as_str()),
            Span::styled("  (YYYY-MM-DD)", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(vec![label("메모:    ", FormField::Note), Span::raw(form.note.as_str())]),
        Line::from(""),
    ];

    if let Some(error) = &form.error {
        form_text.push(Line::from(vec![
            Span::styled(error.to_string(), Style::default().fg(app.theme.error)),
        ]));
    } else {
        form_text.push(Line::from(""));
    }

    form_text.push(Line::from(vec![
        Span::styled("Tab", Style::default().fg(Color::Cyan)),
        Span::raw(" = 다음 항목 | "),
        Span::styled("←/→", Style::default().fg(Color::Cyan)),
        Span::raw(" = 구분 | "),
        Span::styled("Enter", Style::default().fg(Color::Green)),
        Span::raw(" = 저장 | "),
        Span::styled("Esc", Style::default().fg(Color::Red)),
        Span::raw(" = 취소"),
    ]));

    let form_paragraph = Paragraph::new(form_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(" New Event ")
            .style(Style::default().bg(Color::Black)))
        .alignment(Alignment::Left);

    f.render_widget(form_paragraph, form_area);
}
