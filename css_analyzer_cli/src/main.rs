//! # css-analyzer CLI
//!
//! Exit status: 0 on success, 1 when the run fails, 2 on configuration errors.

mod cli;

use clap::Parser;
use cli::Cli;
use css_analyzer::logging::{self, codes};
use css_analyzer::{
    analyze_into, collect_classes, AnalysisReport, AnalysisResult, AnalyzeError, AnalyzerConfig,
    CancellationToken, FileSink, TokenSink, WriterSink,
};
use serde::Serialize;
use std::io::{self, Write};
use std::process::ExitCode;

/// JSON rendering of a result
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    class_names: &'a AnalysisResult,
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(err) => {
            report_error(&AnalyzeError::from(err));
            return ExitCode::from(2);
        }
    };

    init_logging(&args, &config);

    match run(&args, &config, &CancellationToken::new()) {
        Ok(report) => {
            if report.has_warnings() && !args.quiet {
                eprint!("{}", report.diagnostics.format_cargo_style());
            }
            css_analyzer::log_info!("Finished", "summary" => report.summary());
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            if err.is_config_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_logging(args: &Cli, config: &AnalyzerConfig) {
    let level = config.logging.min_level.to_facade_level();
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str()),
    );
    if args.overrides_log_level() {
        builder.filter_level(level.to_level_filter());
    }
    if config.logging.structured {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    // A logger installed by an embedding process wins
    let _ = builder.try_init();

    if let Err(message) = logging::init_global_logging(&config.logging) {
        css_analyzer::log_warning!("Logging already initialized", "detail" => message);
    }
}

fn run(
    args: &Cli,
    config: &AnalyzerConfig,
    cancellation: &CancellationToken,
) -> Result<AnalysisReport, AnalyzeError> {
    if args.json {
        let report = match &args.output {
            Some(path) => analyze_into(&args.root, &mut FileSink::new(path), config, cancellation)?,
            None => collect_classes(&args.root, config, cancellation)?,
        };
        print_json(&report.result)?;
        return Ok(report);
    }

    let mut sink: Box<dyn TokenSink> = match &args.output {
        Some(path) => Box::new(FileSink::new(path)),
        None => Box::new(WriterSink::new(io::stdout().lock(), "<stdout>")),
    };

    analyze_into(&args.root, sink.as_mut(), config, cancellation)
}

fn print_json(result: &AnalysisResult) -> Result<(), AnalyzeError> {
    let to_error = |source: io::Error| css_analyzer::SinkError::Write {
        destination: "<stdout>".into(),
        source,
    };

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &JsonOutput { class_names: result })
        .map_err(|e| to_error(e.into()))?;
    writeln!(stdout).map_err(to_error)?;
    Ok(())
}

fn report_error(err: &AnalyzeError) {
    let code = err.code();
    css_analyzer::log_error!(code, "Analysis failed", "reason" => err);

    eprintln!("error[{}]: {}", code, err);
    let action = codes::get_action(code.as_str());
    if action != "No specific action available" {
        eprintln!("  = help: {}", action);
    }
}
