use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode};

/// Handle a single key input event.
pub fn handle_input(app: &mut App, key: KeyEvent) {
    // Quit works from every mode
    match key.code {
        KeyCode::F(10) | KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        _ => {}
    }

    match app.mode {
        AppMode::Normal => handle_normal_mode(app, key),
        AppMode::Help => handle_help_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('h') => app.toggle_help(),
        KeyCode::Char('c') => app.cycle_color_scheme(),
        KeyCode::Char('s') => app.show_status = !app.show_status,
        _ => {}
    }
}

fn handle_help_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('h') => {
            app.mode = AppMode::Normal;
        }
        _ => {}
    }
}
