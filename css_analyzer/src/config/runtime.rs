//! Runtime preferences: environment defaults, TOML files and validation

use super::constants::{document, pipeline};
use crate::error::ConfigError;
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Most verbose level that is emitted
    pub min_level: LogLevel,

    /// Emit JSON lines instead of text
    pub structured: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            min_level: env::var("CSS_ANALYZER_LOG_LEVEL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(LogLevel::Info),
            structured: env::var("CSS_ANALYZER_STRUCTURED_LOGS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

/// Settings for one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Number of extraction worker threads
    pub workers: usize,

    /// Capacity of the bounded delivery channel
    pub channel_capacity: usize,

    /// Follow symbolic links during traversal
    pub follow_links: bool,

    /// Skip documents larger than this many bytes
    pub max_file_size: Option<u64>,

    pub logging: LoggingPreferences,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            workers: env::var("CSS_ANALYZER_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_workers),
            channel_capacity: env::var("CSS_ANALYZER_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(pipeline::DEFAULT_CHANNEL_CAPACITY),
            follow_links: env::var("CSS_ANALYZER_FOLLOW_LINKS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            max_file_size: env::var("CSS_ANALYZER_MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok()),
            logging: LoggingPreferences::default(),
        }
    }
}

fn default_workers() -> usize {
    num_cpus::get().clamp(1, pipeline::MAX_WORKERS)
}

/// On-disk form; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    workers: Option<usize>,
    channel_capacity: Option<usize>,
    follow_links: Option<bool>,
    max_file_size: Option<u64>,
    logging: Option<LoggingFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingFile {
    level: Option<LogLevel>,
    structured: Option<bool>,
}

impl AnalyzerConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn with_max_file_size(mut self, limit: Option<u64>) -> Self {
        self.max_file_size = limit;
        self
    }

    pub fn with_logging(mut self, logging: LoggingPreferences) -> Self {
        self.logging = logging;
        self
    }

    /// Parse TOML on top of the environment defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::default().merge_toml(contents, "inline configuration")
    }

    /// Load a TOML file on top of the environment defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::default().merge_toml(&contents, &format!("'{}'", path.display()))
    }

    fn merge_toml(mut self, contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            origin: origin.to_string(),
            message: e.message().to_string(),
        })?;

        if let Some(workers) = file.workers {
            self.workers = workers;
        }
        if let Some(capacity) = file.channel_capacity {
            self.channel_capacity = capacity;
        }
        if let Some(follow) = file.follow_links {
            self.follow_links = follow;
        }
        if let Some(limit) = file.max_file_size {
            self.max_file_size = Some(limit);
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.logging.min_level = level;
            }
            if let Some(structured) = logging.structured {
                self.logging.structured = structured;
            }
        }

        Ok(self)
    }

    /// Check every field against its bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 || self.workers > pipeline::MAX_WORKERS {
            return Err(ConfigError::Invalid {
                field: "workers",
                message: format!(
                    "{} is outside 1..={}",
                    self.workers,
                    pipeline::MAX_WORKERS
                ),
            });
        }

        if self.channel_capacity == 0 || self.channel_capacity > pipeline::MAX_CHANNEL_CAPACITY {
            return Err(ConfigError::Invalid {
                field: "channel_capacity",
                message: format!(
                    "{} is outside 1..={}",
                    self.channel_capacity,
                    pipeline::MAX_CHANNEL_CAPACITY
                ),
            });
        }

        if let Some(limit) = self.max_file_size {
            if limit == 0 || limit > document::MAX_FILE_SIZE_CEILING {
                return Err(ConfigError::Invalid {
                    field: "max_file_size",
                    message: format!(
                        "{} is outside 1..={}",
                        limit,
                        document::MAX_FILE_SIZE_CEILING
                    ),
                });
            }
        }

        Ok(())
    }
}
