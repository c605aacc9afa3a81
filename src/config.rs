use std::{path::PathBuf, time::Duration};

use survivor_persistence_sqlite::DB_PATH_VAR;

const FEED_DIR_VAR: &str = "SURVIVOR_FEED_DIR";
const SYNC_INTERVAL_VAR: &str = "SURVIVOR_SYNC_INTERVAL_SECS";
const FEED_DELAY_VAR: &str = "SURVIVOR_FEED_DELAY_MS";
const LOG_FILE_PATH_VAR: &str = "LOG_FILE_PATH";
const LOG_ARCHIVE_PATTERN_VAR: &str = "LOG_ARCHIVE_PATTERN";

const DEFAULT_FEED_DIR: &str = "feed";
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 15 * 60;
const DEFAULT_FEED_DELAY_MS: u64 = 500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} env var not set")]
    Missing(&'static str),
    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFileConfig {
    pub path: String,
    pub archive_pattern: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub feed_dir: PathBuf,
    pub sync_interval: Duration,
    pub feed_delay: Duration,
    pub log_file: Option<LogFileConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = lookup(DB_PATH_VAR).ok_or(ConfigError::Missing(DB_PATH_VAR))?;
        let feed_dir = lookup(FEED_DIR_VAR).unwrap_or_else(|| DEFAULT_FEED_DIR.to_string());
        let sync_interval = parse_u64(&lookup, SYNC_INTERVAL_VAR, DEFAULT_SYNC_INTERVAL_SECS)?;
        let feed_delay = parse_u64(&lookup, FEED_DELAY_VAR, DEFAULT_FEED_DELAY_MS)?;
        if sync_interval == 0 {
            return Err(ConfigError::Invalid {
                var: SYNC_INTERVAL_VAR,
                value: "0".to_string(),
            });
        }

        let log_file = match lookup(LOG_FILE_PATH_VAR) {
            Some(path) => {
                let archive_pattern = lookup(LOG_ARCHIVE_PATTERN_VAR)
                    .ok_or(ConfigError::Missing(LOG_ARCHIVE_PATTERN_VAR))?;
                Some(LogFileConfig {
                    path,
                    archive_pattern,
                })
            }
            None => None,
        };

        Ok(Self {
            db_path,
            feed_dir: PathBuf::from(feed_dir),
            sync_interval: Duration::from_secs(sync_interval),
            feed_delay: Duration::from_millis(feed_delay),
            log_file,
        })
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
