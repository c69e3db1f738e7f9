//! Runtime configuration for hosts embedding the note core.
//!
//! # Responsibility
//! - Resolve database location and logging settings from the environment.
//! - Provide deterministic defaults when nothing is configured.
//!
//! # Invariants
//! - Blank environment values are treated as unset.

use crate::logging::{self, default_log_level, LoggingError};
use serde::Deserialize;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "NOTECARDS_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "NOTECARDS_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "NOTECARDS_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "notecards.sqlite3";

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite file backing the note store.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Rolling log directory. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `NOTECARDS_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        config.log_dir = non_blank(LOG_DIR_ENV).map(PathBuf::from);
        config
    }

    /// Starts rolling file logs in `log_dir` at `log_level`.
    ///
    /// Returns `Ok(false)` without side effects when `log_dir` is unset.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        let Some(log_dir) = self.log_dir.as_ref() else {
            return Ok(false);
        };
        logging::init_logging(&self.log_level, &log_dir.to_string_lossy())?;
        Ok(true)
    }
}
