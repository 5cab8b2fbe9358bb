/// Application configuration: load, save and sanitize.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "FLOW_EDITOR_DATA_DIR";

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the workflow database. Empty = resolved at runtime.
    pub data_dir: String,
    /// Max undo steps kept per editing session (1 to 10 000).
    pub max_history_depth: usize,
    /// Group used when a command does not name one.
    pub default_group: String,
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Whether JSON output is pretty-printed.
    pub pretty_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            max_history_depth: 100,
            default_group: "default".to_string(),
            log_level: "info".to_string(),
            pretty_json: true,
        }
    }
}

impl AppConfig {
    /// Returns the config file path: exe directory + `flow-editor.json`.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("flow-editor.json")))
            .unwrap_or_else(|| PathBuf::from("flow-editor.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (unreadable file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Return defaults on error (don't overwrite broken file)
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.max_history_depth = self.max_history_depth.clamp(1, 10_000);

        let group = self.default_group.trim();
        if group.is_empty() || group.contains('/') {
            self.default_group = "default".to_string();
        } else if group.len() != self.default_group.len() {
            self.default_group = group.to_string();
        }

        self.log_level = self.log_level.to_ascii_lowercase();
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            self.log_level = "info".to_string();
        }
    }

    /// Returns the directory for the workflow database.
    ///
    /// Resolution order:
    /// 1. `data_dir` from the config file (if non-empty)
    /// 2. `FLOW_EDITOR_DATA_DIR` environment variable
    /// 3. Platform local data directory + `flow-editor`
    /// 4. `.data/` directory next to the executable
    pub fn resolve_data_dir(&self) -> PathBuf {
        if !self.data_dir.is_empty() {
            return PathBuf::from(&self.data_dir);
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        if let Some(dir) = dirs::data_local_dir() {
            return dir.join("flow-editor");
        }
        let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
        exe.parent().unwrap_or(Path::new(".")).join(".data")
    }
}
