//! Run outputs: the sorted token list, counters and non-fatal warnings

use crate::error::DocumentError;
use crate::logging::codes::{self, Code};
use crate::logging::{DiagnosticCollector, LogEvent};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Unique class tokens in ascending byte order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult {
    tokens: Vec<String>,
}

impl AnalysisResult {
    /// Build from an arbitrary collection; duplicates are removed and the
    /// remainder sorted
    pub fn from_unsorted<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut tokens: Vec<String> = tokens.into_iter().collect();
        tokens.sort_unstable();
        tokens.dedup();
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }

    /// Binary search over the sorted tokens
    pub fn contains(&self, token: &str) -> bool {
        self.tokens
            .binary_search_by(|candidate| candidate.as_str().cmp(token))
            .is_ok()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tokens
    }
}

impl<'a> IntoIterator for &'a AnalysisResult {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    pub files_discovered: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub tokens_emitted: usize,
    pub unique_tokens: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// A directory below the root could not be enumerated
    SubPath,
    Open,
    Parse,
    TooLarge,
}

impl WarningKind {
    pub fn code(&self) -> Code {
        match self {
            WarningKind::SubPath => codes::traversal::SUB_PATH_UNREADABLE,
            WarningKind::Open => codes::document::OPEN_FAILED,
            WarningKind::Parse => codes::document::INVALID_ENCODING,
            WarningKind::TooLarge => codes::document::FILE_TOO_LARGE,
        }
    }
}

/// A non-fatal condition that caused a path to be skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisWarning {
    pub path: PathBuf,
    pub kind: WarningKind,
    pub message: String,
}

impl AnalysisWarning {
    pub fn new(path: impl Into<PathBuf>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Warning for a traversal error below the root
    pub fn sub_path(root: &Path, err: &walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        let message = match err.loop_ancestor() {
            Some(ancestor) => format!("filesystem loop back to '{}'", ancestor.display()),
            None => err
                .io_error()
                .map(|io| io.to_string())
                .unwrap_or_else(|| err.to_string()),
        };

        Self::new(path, WarningKind::SubPath, message)
    }

    pub fn code(&self) -> Code {
        self.kind.code()
    }

    /// Diagnostic event for this warning
    pub fn to_event(&self) -> LogEvent {
        let headline = match self.kind {
            WarningKind::SubPath => "Skipping unreadable directory entry",
            WarningKind::Open => "Skipping unreadable document",
            WarningKind::Parse => "Skipping unparseable document",
            WarningKind::TooLarge => "Skipping oversized document",
        };

        LogEvent::warning_with_code(self.code(), headline).with_context("reason", &self.message)
    }
}

impl From<DocumentError> for AnalysisWarning {
    fn from(err: DocumentError) -> Self {
        let kind = match &err {
            DocumentError::Open { .. } => WarningKind::Open,
            DocumentError::Parse { .. } => WarningKind::Parse,
            DocumentError::TooLarge { .. } => WarningKind::TooLarge,
        };
        let message = match &err {
            DocumentError::Open { source, .. } => source.to_string(),
            DocumentError::Parse { reason, .. } => reason.clone(),
            DocumentError::TooLarge { size, limit, .. } => {
                format!("{} bytes exceeds limit of {} bytes", size, limit)
            }
        };

        Self::new(err.path(), kind, message)
    }
}

/// Everything a successful run produced
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    pub stats: AnalysisStats,
    pub warnings: Vec<AnalysisWarning>,
    pub diagnostics: DiagnosticCollector,
}

impl AnalysisReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &AnalysisWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} unique class tokens from {} of {} files ({} skipped, {} tokens seen)",
            self.stats.unique_tokens,
            self.stats.files_processed,
            self.stats.files_discovered,
            self.stats.files_skipped,
            self.stats.tokens_emitted
        )
    }
}
