use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;

/// Draw the Help popup (? / F1)
pub fn draw_help(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let heading = Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow);
    let help_text = vec![
        Line::from(Span::styled(
            " cpuview - live per-core CPU usage ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("  Stream: {}", app.endpoint)),
        Line::from(""),
        Line::from(Span::styled(" Keys ", heading)),
        Line::from("  ?/F1        Show/close this help"),
        Line::from(format!("  c           Cycle color scheme ({})", app.color_scheme_id.name())),
        Line::from("  s           Toggle status bar"),
        Line::from("  q/F10       Quit"),
        Line::from("  Ctrl+C      Quit"),
        Line::from(""),
        Line::from(Span::styled(" Bars ", heading)),
        Line::from("  One row per core, in core order."),
        Line::from("  The filled part of a row is the core's usage."),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc or ? to close ",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

/// Create a centered rectangle with percentage width/height
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
