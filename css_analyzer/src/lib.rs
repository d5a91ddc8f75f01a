//! # CSS Class Analyzer
//!
//! Extracts every distinct CSS class token used across a tree of HTML
//! documents and produces a deduplicated list sorted in byte order.
//!
//! ```no_run
//! let report = css_analyzer::analyze("site/", "classes.txt")?;
//! println!("{}", report.summary());
//! # Ok::<(), css_analyzer::AnalyzeError>(())
//! ```
//!
//! The pipeline is scan → parse → extract → aggregate → sink. Files are
//! extracted on a bounded worker pool and their tokens converge on a single
//! consumer, so the aggregate set is never shared between threads.

#[macro_use]
pub mod logging;

pub mod aggregator;
pub mod analyzer;
pub mod cancellation;
pub mod config;
pub mod document;
pub mod error;
pub mod result;
pub mod scanner;
pub mod sink;

pub use aggregator::{Aggregator, TokenSet};
pub use analyzer::{analyze, analyze_into, analyze_with_config, collect_classes};
pub use cancellation::CancellationToken;
pub use config::{AnalyzerConfig, LoggingPreferences};
pub use document::{extract_class_tokens, TokenStream};
pub use error::{AnalyzeError, ConfigError, DocumentError, SinkError};
pub use result::{AnalysisReport, AnalysisResult, AnalysisStats, AnalysisWarning, WarningKind};
pub use scanner::DirectoryScanner;
pub use sink::{write_tokens, FileSink, TokenSink, WriterSink};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
