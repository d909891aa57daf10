pub mod bars;
pub mod footer;
pub mod help;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::app::{App, AppMode};

/// Render the complete UI. Every frame is drawn from scratch.
pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();

    if app.show_status {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // bars
                Constraint::Length(1), // status bar
            ])
            .split(size);
        bars::draw_bars(f, app, chunks[0]);
        footer::draw_footer(f, app, chunks[1]);
    } else {
        bars::draw_bars(f, app, size);
    }

    if app.mode == AppMode::Help {
        help::draw_help(f, app);
    }
}
