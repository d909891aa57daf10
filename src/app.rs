use chrono::{DateTime, Local};

use crate::color_scheme::{ColorScheme, ColorSchemeId};
use crate::config::CpuviewConfig;
use crate::sample::Sample;
use crate::state::ConnectionState;

/// Which view the app is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Help,
}

/// Everything the renderer needs for one frame
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,

    /// Latest sample taken from the display state
    pub sample: Sample,
    pub connection: ConnectionState,
    pub last_update: Option<DateTime<Local>>,
    /// Number of samples rendered so far
    pub updates: u64,

    pub endpoint: String,
    pub show_status: bool,
    pub color_scheme_id: ColorSchemeId,
    pub color_scheme: ColorScheme,
}

impl App {
    pub fn new(config: &CpuviewConfig) -> Self {
        Self {
            mode: AppMode::Normal,
            should_quit: false,
            sample: Sample::default(),
            connection: ConnectionState::Connecting,
            last_update: None,
            updates: 0,
            endpoint: config.endpoint(),
            show_status: config.show_status,
            color_scheme_id: config.color_scheme_id,
            color_scheme: ColorScheme::from_id(config.color_scheme_id),
        }
    }

    /// Replace the displayed sample
    pub fn apply_sample(&mut self, sample: Sample) {
        self.sample = sample;
        self.last_update = Some(Local::now());
        self.updates += 1;
    }

    pub fn cycle_color_scheme(&mut self) {
        self.color_scheme_id = self.color_scheme_id.next();
        self.color_scheme = ColorScheme::from_id(self.color_scheme_id);
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            AppMode::Help => AppMode::Normal,
            AppMode::Normal => AppMode::Help,
        };
    }

    /// Copy the runtime-adjustable settings back into a config for saving
    pub fn store_into(&self, config: &mut CpuviewConfig) {
        config.color_scheme_id = self.color_scheme_id;
        config.show_status = self.show_status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_app_uses_config() {
        let cfg = CpuviewConfig {
            color_scheme_id: ColorSchemeId::DarkVivid,
            show_status: false,
            ..Default::default()
        };
        let app = App::new(&cfg);
        assert_eq!(app.endpoint, "http://127.0.0.1:7032/api/cpus");
        assert_eq!(app.color_scheme.id, ColorSchemeId::DarkVivid);
        assert!(!app.show_status);
        assert!(app.sample.is_empty());
    }

    #[test]
    fn apply_sample_counts_updates() {
        let mut app = App::new(&CpuviewConfig::default());
        app.apply_sample(Sample::new(vec![1.0]));
        app.apply_sample(Sample::new(vec![2.0]));
        assert_eq!(app.updates, 2);
        assert_eq!(app.sample.cores(), &[2.0]);
        assert!(app.last_update.is_some());
    }

    #[test]
    fn store_into_keeps_connection_settings() {
        let mut cfg = CpuviewConfig {
            server: "http://other:1".into(),
            ..Default::default()
        };
        let mut app = App::new(&cfg);
        app.cycle_color_scheme();
        app.show_status = false;
        app.store_into(&mut cfg);

        assert_eq!(cfg.server, "http://other:1");
        assert_eq!(cfg.color_scheme_id, ColorSchemeId::Monochrome);
        assert!(!cfg.show_status);
    }
}
