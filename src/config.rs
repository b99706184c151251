//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::ClientConfig;
use crate::report::{CalendarZone, DateFilter};
use crate::session::FileTokenStore;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Where the session token is kept
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Token file; the platform data directory when unset
    pub token_path: Option<String>,
}

impl SessionConfig {
    pub fn token_path(&self) -> PathBuf {
        self.token_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(FileTokenStore::default_path)
    }
}

/// Date handling for views
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Calendar used to decide what "today" is
    #[serde(default)]
    pub calendar: CalendarZone,

    /// Filter preselected in the transactions list
    #[serde(default)]
    pub default_filter: DateFilter,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("ledger").join("config.toml")),
            Some(PathBuf::from("./ledger.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// HTTP client settings derived from `[api]`
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            request_timeout_ms: self.api.request_timeout_secs.saturating_mul(1000),
        }
    }

    /// Apply `LEDGER_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("LEDGER_API_URL") {
            self.api.base_url = url;
        }

        if let Some(path) = lookup("LEDGER_TOKEN_PATH") {
            self.session.token_path = Some(path);
        }

        if let Some(calendar) = lookup("LEDGER_CALENDAR") {
            match calendar.parse() {
                Ok(zone) => self.display.calendar = zone,
                Err(e) => tracing::warn!("Ignoring LEDGER_CALENDAR: {}", e),
            }
        }

        if let Some(level) = lookup("LEDGER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LEDGER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Ledger Configuration
#
# Environment variables override these settings:
# - LEDGER_API_URL
# - LEDGER_TOKEN_PATH
# - LEDGER_CALENDAR
# - LEDGER_LOG_LEVEL
# - LEDGER_LOG_FORMAT

[api]
# Backend base URL, including the /api prefix
base_url = "http://localhost:8000/api"

# Request timeout in seconds
request_timeout_secs = 30

[session]
# Token file (defaults to the platform data directory)
# token_path = "~/.local/share/ledger/token"

[display]
# Calendar used for "today": local or utc
calendar = "local"

# Preselected transaction filter: all, this-month, last-month, this-year
default_filter = "all"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.client_config().request_timeout_ms, 30_000);
        assert_eq!(config.display.calendar, CalendarZone::Local);
        assert_eq!(config.display.default_filter, DateFilter::All);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.request_timeout_secs, 30);
        assert!(config.session.token_path.is_none());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://ledger.example/api\"\n\n[display]\ncalendar = \"utc\"\ndefault_filter = \"this-month\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.base_url, "https://ledger.example/api");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.display.calendar, CalendarZone::Utc);
        assert_eq!(config.display.default_filter, DateFilter::ThisMonth);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[api\nbase_url = 3").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("LEDGER_API_URL", "http://10.0.0.2:8000/api"),
            ("LEDGER_TOKEN_PATH", "/tmp/ledger-token"),
            ("LEDGER_CALENDAR", "UTC"),
            ("LEDGER_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://10.0.0.2:8000/api");
        assert_eq!(config.session.token_path(), PathBuf::from("/tmp/ledger-token"));
        assert_eq!(config.display.calendar, CalendarZone::Utc);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_bad_calendar_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "LEDGER_CALENDAR").then(|| "mars".to_string()));
        assert_eq!(config.display.calendar, CalendarZone::Local);
    }
}
