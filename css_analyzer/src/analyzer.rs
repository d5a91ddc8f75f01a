//! Entry points for running an analysis

use crate::aggregator::Aggregator;
use crate::cancellation::CancellationToken;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzeError;
use crate::logging::codes;
use crate::result::AnalysisReport;
use crate::sink::{FileSink, TokenSink};
use std::path::Path;

/// Analyze `root` and write the sorted class list to `output`
///
/// Uses the environment-derived default configuration. Prior contents of
/// `output` are replaced. On error `output` is left as it was.
pub fn analyze(
    root: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<AnalysisReport, AnalyzeError> {
    analyze_with_config(
        root,
        output,
        &AnalyzerConfig::default(),
        &CancellationToken::new(),
    )
}

pub fn analyze_with_config(
    root: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &AnalyzerConfig,
    cancellation: &CancellationToken,
) -> Result<AnalysisReport, AnalyzeError> {
    let mut sink = FileSink::new(output.as_ref());
    analyze_into(root, &mut sink, config, cancellation)
}

/// Analyze `root` and hand the result to any sink
pub fn analyze_into<S>(
    root: impl AsRef<Path>,
    sink: &mut S,
    config: &AnalyzerConfig,
    cancellation: &CancellationToken,
) -> Result<AnalysisReport, AnalyzeError>
where
    S: TokenSink + ?Sized,
{
    let report = collect_classes(root.as_ref(), config, cancellation)?;

    sink.write_result(&report.result)?;

    crate::log_success!(
        codes::success::ANALYSIS_COMPLETED,
        "Class analysis completed",
        "root" => root.as_ref().display(),
        "destination" => sink.describe(),
        "unique_tokens" => report.stats.unique_tokens,
        "files" => report.stats.files_processed,
        "skipped" => report.stats.files_skipped
    );

    Ok(report)
}

/// Run the pipeline without persisting anything
pub fn collect_classes(
    root: impl AsRef<Path>,
    config: &AnalyzerConfig,
    cancellation: &CancellationToken,
) -> Result<AnalysisReport, AnalyzeError> {
    Aggregator::new(config.clone())
        .with_cancellation(cancellation.clone())
        .run(root.as_ref())
}
