use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::IntroSkipError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

pub const ENV_TMDB_TOKEN: &str = "INTROSKIP_TMDB_TOKEN";
pub const ENV_INTRODB_API: &str = "INTROSKIP_INTRODB_API";
pub const ENV_INTRODB_KEY: &str = "INTROSKIP_INTRODB_KEY";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub services: ServicesConfig,
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_to_file: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub tmdb: TmdbConfig,
    pub introdb: IntroDbConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntroDbConfig {
    pub api_url: String,
    pub api_key: String,
}

/// Content-session timing, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub poll_interval_ms: u64,
    pub initial_delay_ms: u64,
    pub retry_interval_ms: u64,
    pub retry_ceiling_ms: u64,
    pub trailing_guard_ms: u64,
}

impl PlaybackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms.max(1))
    }

    pub fn retry_ceiling(&self) -> Duration {
        Duration::from_millis(self.retry_ceiling_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        AppConfig::default().playback
    }
}

impl AppConfig {
    /// Load config: user file (if exists) merged over built-in defaults,
    /// then environment overrides.
    pub fn load() -> Result<Self, IntroSkipError> {
        let config = Self::load_from(&Self::config_path())?;
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Read `path` over the built-in defaults, without environment overrides.
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, IntroSkipError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let user_str = std::fs::read_to_string(path)?;
        Self::from_toml(&user_str)
    }

    /// Parse a (possibly partial) TOML document over the built-in defaults.
    pub fn from_toml(user_str: &str) -> Result<Self, IntroSkipError> {
        let mut base: toml::Value =
            toml::from_str(DEFAULT_CONFIG).map_err(|e| IntroSkipError::Config(e.to_string()))?;
        let user: toml::Value =
            toml::from_str(user_str).map_err(|e| IntroSkipError::Config(e.to_string()))?;
        merge_toml(&mut base, user);
        base.try_into()
            .map_err(|e: toml::de::Error| IntroSkipError::Config(e.to_string()))
    }

    /// Apply `INTROSKIP_*` overrides; blank values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = get(ENV_TMDB_TOKEN) {
            self.services.tmdb.token = token;
        }
        if let Some(url) = get(ENV_INTRODB_API) {
            self.services.introdb.api_url = url;
        }
        if let Some(key) = get(ENV_INTRODB_KEY) {
            self.services.introdb.api_key = key;
        }
        self
    }

    /// Write the whole config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), IntroSkipError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| IntroSkipError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the database file.
    pub fn db_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("introskip.db"))
            .unwrap_or_else(|| PathBuf::from("introskip.db"))
    }

    /// Directory for rotated log files.
    pub fn log_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path() -> Result<PathBuf, IntroSkipError> {
        let path = Self::db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "introskip")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

/// Recursively overlay `overlay` onto `base`. Tables merge, everything else replaces.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
