//! Configuration for embedded terminal panes.
//!
//! Hosts can construct a [`Config`] directly or load one from
//! `~/.termpane/config.toml`:
//!
//! ```toml
//! # Shell to run (platform default when omitted)
//! shell = "zsh"
//! args = ["-l"]
//!
//! # Initial grid size
//! cols = 80
//! rows = 24
//!
//! # Scrollback lines retained above the viewport
//! scrollback = 1000
//!
//! [cursor]
//! style = "bar"        # bar, block, underline
//! blink = true
//! blink_rate_ms = 530
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::cell::CursorShape;

/// Pane configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell command; the platform default when `None`.
    pub shell: Option<String>,
    /// Arguments passed to the shell.
    pub args: Vec<String>,
    /// Working directory for the child; inherited when `None`.
    pub cwd: Option<PathBuf>,
    /// Initial grid size.
    pub cols: u16,
    pub rows: u16,
    /// Scrollback lines retained above the viewport.
    pub scrollback: usize,
    /// Cursor appearance.
    pub cursor: CursorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: None,
            args: Vec::new(),
            cwd: None,
            cols: 80,
            rows: 24,
            scrollback: 1000,
            cursor: CursorConfig::default(),
        }
    }
}

/// Cursor appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// "bar", "block" or "underline".
    pub style: String,
    pub blink: bool,
    pub blink_rate_ms: u64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            style: "bar".to_string(),
            blink: true,
            blink_rate_ms: crate::view::cursor::DEFAULT_BLINK_RATE_MS,
        }
    }
}

impl CursorConfig {
    pub fn shape(&self) -> CursorShape {
        CursorShape::by_name(&self.style)
    }

    pub fn blink_rate(&self) -> Duration {
        Duration::from_millis(if self.blink_rate_ms > 0 {
            self.blink_rate_ms
        } else {
            crate::view::cursor::DEFAULT_BLINK_RATE_MS
        })
    }
}

impl Config {
    /// Load configuration from the default file, falling back to defaults.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    /// Save configuration to the default file.
    pub fn save(&self) -> Result<(), String> {
        if let Some(path) = Self::config_path() {
            let content = toml::to_string_pretty(self)
                .map_err(|e| format!("Failed to serialize config: {}", e))?;
            fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
            Ok(())
        } else {
            Err("Could not determine config path".to_string())
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Some(home) = home_dir() {
            let dir = home.join(".termpane");
            if !dir.exists() {
                let _ = fs::create_dir_all(&dir);
            }
            return Some(dir.join("config.toml"));
        }
        None
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
