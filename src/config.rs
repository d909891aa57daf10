//! cpuview configuration persistence (htoprc-style key=value format)
//!
//! Lives at `<config dir>/cpuview/cpuviewrc`, e.g. `~/.config/cpuview/cpuviewrc`
//! on Linux or `%APPDATA%\cpuview\cpuviewrc` on Windows.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::color_scheme::ColorSchemeId;

/// Path of the event stream on the server
pub const CPUS_PATH: &str = "/api/cpus";

/// Port the stock cpu server listens on
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:7032";

/// EventSource's customary reconnection delay
pub const DEFAULT_RETRY_MS: u64 = 3000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Default config file path: `<config dir>/cpuview/cpuviewrc`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cpuview").join("cpuviewrc"))
}

/// Default log file, next to the config file
pub fn default_log_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cpuview").join("cpuview.log"))
}

/// Persistable settings
#[derive(Debug, Clone, PartialEq)]
pub struct CpuviewConfig {
    /// Base URL of the server; the stream lives at `server + CPUS_PATH`
    pub server: String,
    pub retry_ms: u64,
    pub request_timeout_ms: u64,
    pub color_scheme_id: ColorSchemeId,
    pub show_status: bool,
}

impl Default for CpuviewConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            retry_ms: DEFAULT_RETRY_MS,
            request_timeout_ms: 5000,
            color_scheme_id: ColorSchemeId::Default,
            show_status: true,
        }
    }
}

impl CpuviewConfig {
    /// Load config from `path`, returning defaults if the file doesn't exist
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Parse rc file contents. Unknown keys and bad values are skipped.
    pub fn parse(content: &str) -> Self {
        let mut cfg = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();
                match key {
                    "server" => {
                        if !value.is_empty() {
                            cfg.server = value.to_string();
                        }
                    }
                    "retry_ms" => {
                        if let Ok(v) = value.parse::<u64>() {
                            cfg.retry_ms = clamp_retry_ms(v);
                        }
                    }
                    "request_timeout_ms" => {
                        if let Ok(v) = value.parse::<u64>() {
                            cfg.request_timeout_ms = v.clamp(500, 60_000);
                        }
                    }
                    "color_scheme" => {
                        if let Ok(idx) = value.parse::<usize>() {
                            cfg.color_scheme_id = ColorSchemeId::from_index(idx);
                        }
                    }
                    "show_status" => cfg.show_status = value == "1",
                    _ => {} // Ignore unknown keys
                }
            }
        }

        cfg
    }

    /// Full URL of the CPU event stream
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.server.trim_end_matches('/'), CPUS_PATH)
    }

    pub fn retry(&self) -> Duration {
        Duration::from_millis(self.retry_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Save config to `path`, creating the parent directory
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let b = |v: bool| if v { "1" } else { "0" };
        let lines = [
            "# cpuview configuration file".to_string(),
            "# Rewritten on exit; edit while cpuview is not running".to_string(),
            String::new(),
            format!("server={}", self.server),
            format!("retry_ms={}", self.retry_ms),
            format!("request_timeout_ms={}", self.request_timeout_ms),
            format!("color_scheme={}", self.color_scheme_id as usize),
            format!("show_status={}", b(self.show_status)),
        ];

        let content = lines.join("\n") + "\n";
        let mut file = fs::File::create(path).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;

        Ok(())
    }
}

pub fn clamp_retry_ms(ms: u64) -> u64 {
    ms.clamp(100, 60_000)
}
