//! Error types for the analyzer
//!
//! `DocumentError` never escapes a run: the aggregator turns it into a warning.
//! Everything reachable from [`AnalyzeError`] is terminal.

use crate::logging::codes::{self, Code};
use std::path::PathBuf;

/// Per-file extraction failures; the file is skipped
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{}': {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Skipped '{}': {size} bytes exceeds limit of {limit} bytes", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}

impl DocumentError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            DocumentError::Open { path, .. }
            | DocumentError::Parse { path, .. }
            | DocumentError::TooLarge { path, .. } => path,
        }
    }

    pub fn code(&self) -> Code {
        match self {
            DocumentError::Open { .. } => codes::document::OPEN_FAILED,
            DocumentError::Parse { .. } => codes::document::INVALID_ENCODING,
            DocumentError::TooLarge { .. } => codes::document::FILE_TOO_LARGE,
        }
    }
}

/// Output destination failures
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to create output '{}': {source}", .destination.display())]
    Create {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output '{}': {source}", .destination.display())]
    Write {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SinkError {
    pub fn code(&self) -> Code {
        match self {
            SinkError::Create { .. } => codes::sink::DESTINATION_CREATE_FAILED,
            SinkError::Write { .. } => codes::sink::DESTINATION_WRITE_FAILED,
        }
    }
}

/// Configuration loading and validation failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration from {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    pub fn code(&self) -> Code {
        match self {
            ConfigError::Read { .. } | ConfigError::Parse { .. } => {
                codes::config::CONFIG_FILE_UNREADABLE
            }
            ConfigError::Invalid { .. } => codes::config::INVALID_CONFIGURATION,
        }
    }
}

/// Terminal failure of an analysis run
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Failed to enumerate root '{}': {source}", .root.display())]
    Traversal {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Write(#[from] SinkError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Failed to spawn thread '{thread}': {source}")]
    Spawn {
        thread: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker thread '{worker}' panicked")]
    WorkerPanicked { worker: String },

    #[error("Only {delivered} of {dispatched} dispatched files reported back")]
    Incomplete { dispatched: usize, delivered: usize },
}

impl AnalyzeError {
    pub fn code(&self) -> Code {
        match self {
            AnalyzeError::Traversal { .. } => codes::traversal::ROOT_ENUMERATION_FAILED,
            AnalyzeError::Write(err) => err.code(),
            AnalyzeError::Config(err) => err.code(),
            AnalyzeError::Cancelled => codes::run::CANCELLED,
            AnalyzeError::Spawn { .. } => codes::system::INTERNAL_ERROR,
            AnalyzeError::WorkerPanicked { .. } => codes::system::WORKER_PANICKED,
            AnalyzeError::Incomplete { .. } => codes::system::INCOMPLETE_DRAIN,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, AnalyzeError::Config(_))
    }
}
