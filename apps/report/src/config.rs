//! # Report Configuration
//!
//! Settings for the reporting CLI.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command line flags (`--db`, `--window-days`, `--format`)
//! 2. Environment variables (`WHISPER_*`)
//! 3. Config file (`--config PATH`, or `report.toml` in the platform config dir)
//! 4. Defaults (this file)
//!
//! ## Example `report.toml`
//! ```toml
//! [database]
//! path = "/var/lib/whisper/whisper.db"
//!
//! [attribution]
//! window_days = 14
//!
//! [output]
//! format = "table"
//! ```
//!
//! Every section and key is optional.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use whisper_core::{AttributionConfig, DEFAULT_ATTRIBUTION_WINDOW_DAYS, MAX_ATTRIBUTION_WINDOW_DAYS};
use whisper_db::DbConfig;

use crate::output::OutputFormat;

/// Database file override.
pub const ENV_DB_PATH: &str = "WHISPER_DB_PATH";
/// Attribution window override, in days.
pub const ENV_WINDOW_DAYS: &str = "WHISPER_ATTRIBUTION_WINDOW_DAYS";
/// Output format override (`json` or `table`).
pub const ENV_OUTPUT: &str = "WHISPER_OUTPUT";
/// Log filter, in `tracing_subscriber::EnvFilter` syntax.
pub const ENV_LOG: &str = "WHISPER_LOG";

/// Name of the config file looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "report.toml";

// =============================================================================
// Configuration Types
// =============================================================================

/// Reporting CLI configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub database: DatabaseSettings,
    pub attribution: AttributionSettings,
    pub output: OutputSettings,
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
    /// SQLite file. Default: `whisper.db` in the platform data directory.
    pub path: PathBuf,

    /// Pool size. Default: 5
    pub max_connections: u32,
}

/// `[attribution]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttributionSettings {
    /// Phone match window, in days. Default: 14
    pub window_days: u32,
}

/// `[output]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: 5,
        }
    }
}

impl Default for AttributionSettings {
    fn default() -> Self {
        AttributionSettings {
            window_days: DEFAULT_ATTRIBUTION_WINDOW_DAYS,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("attribution.window_days must be between 1 and {max}, got {days}")]
    WindowOutOfRange { days: u32, max: u32 },

    #[error("database.path must not be empty")]
    EmptyDatabasePath,

    #[error("database.max_connections must be at least 1")]
    NoConnections,
}

// =============================================================================
// Loading
// =============================================================================

/// Platform directories for the CLI.
///
/// - **Linux**: `~/.config/whisper-report`, `~/.local/share/whisper-report`
/// - **macOS**: `~/Library/Application Support/co.goldwhisper.whisper-report`
/// - **Windows**: `%APPDATA%\goldwhisper\whisper-report`
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("co", "goldwhisper", "whisper-report")
}

/// Default database location, falling back to the working directory when
/// no home directory is known.
pub fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("whisper.db"))
        .unwrap_or_else(|| PathBuf::from("whisper.db"))
}

/// `report.toml` in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl ReportConfig {
    /// Loads defaults, then the config file, then the process environment.
    ///
    /// The result is not validated: command-line flags still apply on top,
    /// so call [`ReportConfig::validate`] once they have.
    ///
    /// An explicit `path` must exist. The default config file is optional.
    /// `lookup` reads one environment variable; `main` passes
    /// `std::env::var`.
    pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(found) => Self::from_file(&found)?,
                None => {
                    debug!("No config file, using defaults");
                    ReportConfig::default()
                }
            },
        };

        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Reads a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses TOML text. Missing sections and keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Applies `WHISPER_*` overrides using `lookup` to read variables.
    ///
    /// Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = get(ENV_DB_PATH) {
            self.database.path = PathBuf::from(path);
        }

        if let Some(days) = get(ENV_WINDOW_DAYS) {
            self.attribution.window_days =
                days.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_WINDOW_DAYS.to_string(),
                    value: days.clone(),
                })?;
        }

        if let Some(format) = get(ENV_OUTPUT) {
            self.output.format = format.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_OUTPUT.to_string(),
                value: format.clone(),
            })?;
        }

        Ok(())
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let days = self.attribution.window_days;
        if days == 0 || days > MAX_ATTRIBUTION_WINDOW_DAYS {
            return Err(ConfigError::WindowOutOfRange {
                days,
                max: MAX_ATTRIBUTION_WINDOW_DAYS,
            });
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::NoConnections);
        }

        Ok(())
    }

    pub fn attribution_config(&self) -> AttributionConfig {
        AttributionConfig::with_window_days(self.attribution.window_days)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
