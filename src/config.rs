//! Application configuration loaded from TOML.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::GameRules;

/// Environment variable that overrides [`AppConfig::database_path`].
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Top-level configuration.
///
/// ```toml
/// database_path = "hangman.db"
///
/// [rules]
/// max_attempts = 7
/// completion_bonus = 20
/// points_per_letter = 1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    database_path: String,

    /// Round limits and point values.
    #[serde(default)]
    rules: GameRules,
}

#[instrument]
fn default_database_path() -> String {
    "hangman.db".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            rules: GameRules::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(database = %config.database_path, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if *config.rules.max_attempts() == 0 {
            return Err(ConfigError::new("rules.max_attempts must be at least 1"));
        }
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise starts from defaults, then applies
    /// the `DATABASE_URL` override.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };
        Ok(config.with_database_override(std::env::var(DATABASE_URL_ENV).ok()))
    }

    /// Replaces the database path when `database` is set.
    #[instrument(skip(self))]
    pub fn with_database_override(mut self, database: Option<String>) -> Self {
        if let Some(database) = database.filter(|d| !d.trim().is_empty()) {
            debug!(database = %database, "Database path overridden");
            self.database_path = database;
        }
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
