use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use courtesy_cal::{app::AppState, ui::theme::Theme};

pub fn render(f: &mut Frame, app: &AppState) {
    let area = f.size();
    let help_width = 60.min(area.width);
    let help_height = 23.min(area.height);
    let x = (area.width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = ratatui::layout::Rect {
        x,
        y,
        width: help_width,
        height: help_height,
    };

    f.render_widget(Clear, help_area);

    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().fg(app.theme.help_section))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("경조사 매니저 Help", Style::default().fg(app.theme.help_title).add_modifier(Modifier::BOLD))]),
        Line::from(""),
        section("Navigation:"),
        Line::from("  h/l      - Previous/next day"),
        Line::from("  j/k      - Select event (or week if none)"),
        Line::from("  J/K      - Previous/next week"),
        Line::from("  t        - Jump to today"),
        Line::from("  g/G      - First/last day of month"),
        Line::from("  { / }    - Previous/next month"),
        Line::from(""),
        section("Events:"),
        Line::from("  a        - Add event"),
        Line::from("  1        - Toggle wreath (화환)"),
        Line::from("  2        - Toggle money gift (경조금)"),
        Line::from("  3        - Toggle telegram/visit (전보/방문)"),
        Line::from("  x        - Delete selected event"),
        Line::from(""),
        section("Commands:"),
        Line::from("  :q             - Quit"),
        Line::from("  :w, :refresh   - Reload the event list"),
        Line::from("  :goto DATE     - Jump to date (:goto 2025-12-25)"),
        Line::from("  :new [NAME]    - Add event for a company"),
        Line::from("  :export [DIR]  - Write 경조사관리_<date>.xlsx"),
        Line::from("  :import FILE   - Import an .xlsx/.xls file"),
        Line::from(format!("  :theme NAME    - {}", Theme::available_themes().join(", "))),
        Line::from("  :help          - Show this help"),
        Line::from(""),
    ];

    let visible_lines = help_height.saturating_sub(3) as usize;
    let total_lines = help_text.len();
    let max_scroll = total_lines.saturating_sub(visible_lines);
    let scroll = app.help_scroll.min(max_scroll);

    let scrolled_text: Vec<Line> = help_text
        .into_iter()
        .skip(scroll)
        .take(visible_lines)
        .collect();

    let help_paragraph = Paragraph::new(scrolled_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!(" Help (j/k to scroll, q to close) [{}/{}] ", scroll + 1, total_lines))
            .style(Style::default().bg(Color::Black)))
        .alignment(Alignment::Left);

    f.render_widget(help_paragraph, help_area);
}
