use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, AppMode};
use crate::state::ConnectionState;

/// (key_label, description)
const KEYS_NORMAL: &[(&str, &str)] = &[
    ("q", "Quit "),
    ("c", "Colors "),
    ("s", "Status "),
    ("?", "Help "),
];

const KEYS_HELP: &[(&str, &str)] = &[("Esc", "Close "), ("q", "Quit ")];

/// Draw the bottom status bar: key hints, connection state, core summary
pub fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let cs = &app.color_scheme;

    // Full-width background first
    f.render_widget(
        Paragraph::new(" ".repeat(area.width as usize)).style(cs.footer_label_style()),
        area,
    );

    let keys = match app.mode {
        AppMode::Help => KEYS_HELP,
        AppMode::Normal => KEYS_NORMAL,
    };

    let mut spans: Vec<Span> = Vec::new();
    for (key, desc) in keys {
        spans.push(Span::styled(key.to_string(), cs.footer_key_style()));
        spans.push(Span::styled(format!(" {}", desc), cs.footer_label_style()));
    }

    let status_color = match app.connection {
        ConnectionState::Open => cs.status_live,
        ConnectionState::Connecting | ConnectionState::Reconnecting { .. } => cs.status_waiting,
        ConnectionState::Closed { .. } => cs.status_closed,
    };
    spans.push(Span::styled(
        format!(" {} ", app.connection),
        Style::default()
            .fg(status_color)
            .bg(cs.footer_label_bg)
            .add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(summary(app), cs.footer_label_style()));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// e.g. `8 cores  avg 23.4%  14:03:22  http://127.0.0.1:7032/api/cpus`
fn summary(app: &App) -> String {
    let mut parts = vec![
        format!("{} cores", app.sample.len()),
        format!("avg {:.1}%", app.sample.average()),
    ];
    if let Some(ts) = app.last_update {
        parts.push(ts.format("%H:%M:%S").to_string());
    }
    parts.push(app.endpoint.clone());
    parts.join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CpuviewConfig;
    use crate::sample::Sample;

    #[test]
    fn summary_without_updates() {
        let app = App::new(&CpuviewConfig::default());
        assert_eq!(
            summary(&app),
            "0 cores  avg 0.0%  http://127.0.0.1:7032/api/cpus"
        );
    }

    #[test]
    fn summary_reports_average() {
        let mut app = App::new(&CpuviewConfig::default());
        app.apply_sample(Sample::new(vec![10.0, 30.0]));
        let text = summary(&app);
        assert!(text.starts_with("2 cores  avg 20.0%  "));
        assert!(text.ends_with("/api/cpus"));
    }
}
