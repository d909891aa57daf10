//! cpuview: live per-core CPU usage bars in the terminal.
//!
//! Subscribes to a server-sent event stream at `<server>/api/cpus` where each
//! message is a JSON array of per-core usage percentages, and redraws one bar
//! per core whenever a new sample arrives.
//!
//! Keybindings: press '?' for help.

#![allow(dead_code)]

mod app;
mod color_scheme;
mod config;
mod input;
mod sample;
mod sse;
mod state;
mod subscriber;
mod ui;

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use config::CpuviewConfig;
use state::{Change, DisplayState};
use subscriber::Subscriber;

#[derive(Parser, Debug)]
#[command(name = "cpuview", version, about = "Live per-core CPU usage from a server-sent event stream")]
struct Args {
    /// Server base URL; samples are read from <SERVER>/api/cpus
    #[arg(long)]
    server: Option<String>,

    /// Reconnection delay in milliseconds (the server may override it)
    #[arg(long)]
    retry_ms: Option<u64>,

    /// Color scheme index (0 Default, 1 Monochrome, 2 Light Terminal, 3 Dark Vivid)
    #[arg(long)]
    color_scheme: Option<usize>,

    /// Config file to use instead of the default cpuviewrc
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here instead of cpuview.log in the config directory
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Start with the status bar hidden
    #[arg(long)]
    no_status: bool,
}

impl Args {
    /// Command-line flags win over the config file
    fn apply(&self, cfg: &mut CpuviewConfig) {
        if let Some(server) = &self.server {
            cfg.server = server.clone();
        }
        if let Some(ms) = self.retry_ms {
            cfg.retry_ms = config::clamp_retry_ms(ms);
        }
        if let Some(idx) = self.color_scheme {
            cfg.color_scheme_id = color_scheme::ColorSchemeId::from_index(idx);
        }
        if self.no_status {
            cfg.show_status = false;
        }
    }
}

/// Log to a file; the terminal belongs to the UI. No file, no logs.
///
/// Runs before raw mode, so a log file that can't be opened is reported on
/// stderr.
fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path.or_else(config::default_log_path) else {
        return;
    };
    let file = match open_log_file(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cpuview: logging disabled, cannot open {}: {}", path.display(), e);
            return;
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cpuview=info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .init();
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config.clone().or_else(config::default_config_path);
    let mut config = match &config_path {
        Some(path) => CpuviewConfig::load_from(path),
        None => CpuviewConfig::default(),
    };
    args.apply(&mut config);
    init_logging(args.log_file.clone());

    let state = DisplayState::new();
    let mut subscriber = Subscriber::new(&config)?;
    tracing::info!(
        endpoint = %subscriber.endpoint(),
        "cpuview v{}",
        env!("CARGO_PKG_VERSION")
    );
    let mut app = App::new(&config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, &mut app, &mut subscriber, &state).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!(
        accepted = subscriber.accepted(),
        rejected = subscriber.rejected(),
        "shutting down"
    );

    // Persist settings changed from the keyboard
    if app.color_scheme_id != config.color_scheme_id || app.show_status != config.show_status {
        if let Some(path) = &config_path {
            let mut saved = CpuviewConfig::load_from(path);
            app.store_into(&mut saved);
            if let Err(e) = saved.save_to(path) {
                tracing::warn!(error = %e, "could not save settings");
            }
        }
    }

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Main application loop: one task multiplexing the event stream, display
/// state changes and keyboard input. Redraws after each of them.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    subscriber: &mut Subscriber,
    state: &DisplayState,
) -> Result<()> {
    let mut view = state.subscribe();
    let mut events = EventStream::new();
    let mut stream_done = false;

    let stream = subscriber.run(state);
    tokio::pin!(stream);

    terminal.draw(|f| ui::draw(f, app))?;

    loop {
        tokio::select! {
            result = &mut stream, if !stream_done => {
                stream_done = true;
                match result {
                    Ok(never) => match never {},
                    // Already reflected in the connection state; keep showing the last sample.
                    Err(e) => tracing::warn!(error = %e, "no more updates"),
                }
            }
            change = view.changed() => match change {
                Some(Change::Sample(sample)) => app.apply_sample(sample),
                Some(Change::Connection(connection)) => app.connection = connection,
                None => return Ok(()),
            },
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    // On Windows, crossterm fires Press and Release; only handle Press
                    if key.kind == KeyEventKind::Press {
                        input::handle_input(app, key);
                    }
                }
                // Resize and friends just need a redraw
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }

        if app.should_quit {
            return Ok(());
        }

        terminal.draw(|f| ui::draw(f, app))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_scheme::ColorSchemeId;

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "cpuview",
            "--server",
            "http://box:9000",
            "--retry-ms",
            "20",
            "--color-scheme",
            "2",
            "--no-status",
        ])
        .unwrap();

        let mut cfg = CpuviewConfig::default();
        args.apply(&mut cfg);

        assert_eq!(cfg.endpoint(), "http://box:9000/api/cpus");
        assert_eq!(cfg.retry_ms, 100);
        assert_eq!(cfg.color_scheme_id, ColorSchemeId::LightTerminal);
        assert!(!cfg.show_status);
    }

    #[test]
    fn no_flags_keep_config() {
        let args = Args::try_parse_from(["cpuview"]).unwrap();
        let mut cfg = CpuviewConfig::parse("server=http://saved:1\nretry_ms=500\n");
        args.apply(&mut cfg);
        assert_eq!(cfg.server, "http://saved:1");
        assert_eq!(cfg.retry_ms, 500);
        assert!(cfg.show_status);
    }

    #[test]
    fn config_and_log_paths() {
        let args = Args::try_parse_from([
            "cpuview",
            "--config",
            "/tmp/rc",
            "--log-file",
            "/tmp/cpuview.log",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/rc")));
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/cpuview.log")));
    }

    #[test]
    fn log_file_and_its_directory_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("cpuview.log");
        open_log_file(&path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn unusable_log_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        assert!(open_log_file(&blocker.join("cpuview.log")).is_err());
    }
}
