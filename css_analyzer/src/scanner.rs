//! Recursive discovery of HTML documents under a root directory

use crate::cancellation::CancellationToken;
use crate::config::constants::scanning::HTML_SUFFIX;
use crate::error::AnalyzeError;
use crate::logging::codes;
use crate::result::AnalysisWarning;
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

/// One discovery outcome handed to the caller
#[derive(Debug)]
pub enum ScanItem {
    File(PathBuf),
    Warning(AnalysisWarning),
}

/// Counts from a completed scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub files: usize,
    pub warnings: usize,
    /// The visitor asked to stop before the walk finished
    pub stopped: bool,
}

/// Discovered files and sub-path warnings, for callers that only want discovery
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<AnalysisWarning>,
}

pub struct DirectoryScanner {
    root: PathBuf,
    follow_links: bool,
    cancellation: CancellationToken,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Walk the tree, passing each `.html` file and sub-path warning to `visit`
    ///
    /// `visit` returns `false` to stop early. An error enumerating the root is
    /// returned as [`AnalyzeError::Traversal`]; errors below it become warnings.
    pub fn scan<F>(&self, mut visit: F) -> Result<ScanSummary, AnalyzeError>
    where
        F: FnMut(ScanItem) -> bool,
    {
        crate::log_debug!("Starting directory scan",
            "root" => self.root.display(),
            "follow_links" => self.follow_links
        );

        let mut summary = ScanSummary::default();
        let walker = WalkDir::new(&self.root).follow_links(self.follow_links);

        for entry in walker {
            if self.cancellation.is_cancelled() {
                return Err(AnalyzeError::Cancelled);
            }

            let item = match entry {
                Ok(entry) if is_html_file(&entry) => {
                    summary.files += 1;
                    ScanItem::File(entry.into_path())
                }
                Ok(_) => continue,
                Err(err) if err.depth() == 0 => {
                    crate::log_error!(
                        codes::traversal::ROOT_ENUMERATION_FAILED,
                        "Cannot enumerate root directory",
                        "root" => self.root.display(),
                        "reason" => err
                    );
                    return Err(AnalyzeError::Traversal {
                        root: self.root.clone(),
                        source: err,
                    });
                }
                Err(err) => {
                    summary.warnings += 1;
                    ScanItem::Warning(AnalysisWarning::sub_path(&self.root, &err))
                }
            };

            if !visit(item) {
                summary.stopped = true;
                break;
            }
        }

        crate::log_success!(
            codes::success::SCAN_COMPLETED,
            "Directory scan completed",
            "root" => self.root.display(),
            "files" => summary.files,
            "warnings" => summary.warnings
        );

        Ok(summary)
    }

    /// Discover without dispatching
    pub fn collect(&self) -> Result<Discovery, AnalyzeError> {
        let mut discovery = Discovery::default();

        self.scan(|item| {
            match item {
                ScanItem::File(path) => discovery.files.push(path),
                ScanItem::Warning(warning) => discovery.warnings.push(warning),
            }
            true
        })?;

        Ok(discovery)
    }
}

/// Non-directory whose name ends with the HTML suffix, compared byte-wise
///
/// An unfollowed symlink counts unless it points at a directory. A dangling
/// link is still dispatched so the open failure surfaces as a warning.
fn is_html_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    let candidate = file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir());

    candidate
        && entry
            .file_name()
            .as_encoded_bytes()
            .ends_with(HTML_SUFFIX.as_bytes())
}
