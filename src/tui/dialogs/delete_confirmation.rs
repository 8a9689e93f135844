use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use courtesy_cal::app::AppState;

pub fn render(f: &mut Frame, app: &AppState) {
    let Some(event_id) = app.delete_flow.pending() else {
        return;
    };

    let company = app
        .find_event(event_id)
        .map(|e| e.company_name.as_str())
        .unwrap_or("이 일정");

    let area = f.size();
    let dialog_width = 50.min(area.width);
    let dialog_height = 9.min(area.height);
    let x = (area.width.saturating_sub(dialog_width)) / 2;
    let y = (area.height.saturating_sub(dialog_height)) / 2;

    let dialog_area = ratatui::layout::Rect {
        x,
        y,
        width: dialog_width,
        height: dialog_height,
    };

    f.render_widget(Clear, dialog_area);

    let dialog_text = vec![
        Line::from(vec![Span::styled("일정 삭제", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))]),
        Line::from(""),
        Line::from(vec![
            Span::styled(company, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" 일정을 삭제하시겠습니까?"),
        ]),
        Line::from("삭제된 데이터는 복구할 수 없습니다."),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Red)),
            Span::raw(" = 삭제 | "),
            Span::styled("n/Esc", Style::default().fg(Color::Green)),
            Span::raw(" = 취소"),
        ]),
    ];

    let dialog_paragraph = Paragraph::new(dialog_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(" Confirm Delete ")
            .style(Style::default().bg(Color::Black)))
        .alignment(Alignment::Center);

    f.render_widget(dialog_paragraph, dialog_area);
}
