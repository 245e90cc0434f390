//! Application configuration.
//!
//! Everything lives under one home directory: `$POMODORO_HOME` when set,
//! otherwise `~/.pomodoro`. An optional `config.toml` there may override the
//! socket path and the default session lengths:
//!
//! ```toml
//! socket_path = "/tmp/pomodoro.sock"
//!
//! [session]
//! pomodoro_minutes = 50
//! short_break_minutes = 10
//! long_break_minutes = 20
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::session::SessionError;
use crate::types::SessionConfig;

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "POMODORO_HOME";

const DEFAULT_HOME_DIR: &str = ".pomodoro";
const CONFIG_FILE: &str = "config.toml";
const SOCKET_FILE: &str = "pomodoro.sock";
const SESSIONS_FILE: &str = "sessions.json";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the home directory; set {}", HOME_ENV)]
    NoHomeDir,

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] SessionError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    socket_path: Option<PathBuf>,
    session: SessionDefaults,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SessionDefaults {
    pomodoro_minutes: u32,
    short_break_minutes: u32,
    long_break_minutes: u32,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        let config = SessionConfig::default();
        Self {
            pomodoro_minutes: config.pomodoro_minutes,
            short_break_minutes: config.short_break_minutes,
            long_break_minutes: config.long_break_minutes,
        }
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Data directory
    pub home: PathBuf,
    /// IPC socket path
    pub socket_path: PathBuf,
    /// Session lengths used when `init` does not specify them
    pub defaults: SessionConfig,
}

impl AppConfig {
    /// Loads configuration from the resolved home directory.
    pub fn load() -> Result<Self, ConfigError> {
        let home = Self::resolve_home()?;
        Self::load_from(&home)
    }

    /// Loads configuration from `home`, falling back to defaults when there
    /// is no config file.
    pub fn load_from(home: &Path) -> Result<Self, ConfigError> {
        let path = home.join(CONFIG_FILE);
        let file = match std::fs::read_to_string(&path) {
            Ok(raw) => toml::from_str::<FileConfig>(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        let defaults = SessionConfig {
            pomodoro_minutes: file.session.pomodoro_minutes,
            short_break_minutes: file.session.short_break_minutes,
            long_break_minutes: file.session.long_break_minutes,
        };
        defaults.validate()?;

        Ok(Self {
            home: home.to_path_buf(),
            socket_path: file
                .socket_path
                .unwrap_or_else(|| home.join(SOCKET_FILE)),
            defaults,
        })
    }

    /// `$POMODORO_HOME`, or `~/.pomodoro`.
    pub fn resolve_home() -> Result<PathBuf, ConfigError> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(home));
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_HOME_DIR))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Path of the saved-session document.
    pub fn sessions_path(&self) -> PathBuf {
        self.home.join(SESSIONS_FILE)
    }
}
