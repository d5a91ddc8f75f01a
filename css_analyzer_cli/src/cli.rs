//! Command-line arguments and configuration resolution

use clap::{ArgAction, Parser};
use css_analyzer::logging::LogLevel;
use css_analyzer::{AnalyzerConfig, ConfigError};
use std::path::PathBuf;

/// Extract every distinct CSS class used across a tree of HTML files
#[derive(Parser, Debug, Clone)]
#[command(
    name = "css-analyzer",
    version,
    about = "Extract every distinct CSS class used across a tree of HTML files",
    after_help = "EXAMPLES:\n    \
        css-analyzer site/                      # sorted list on stdout\n    \
        css-analyzer site/ -o classes.txt       # write (and replace) a file\n    \
        css-analyzer site/ --json -j 4          # JSON on stdout, 4 workers\n    \
        css-analyzer site/ -c analyzer.toml -v  # settings from a file, debug logs"
)]
pub struct Cli {
    /// Directory to scan for .html files
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Write the class list to FILE instead of stdout; existing contents are replaced
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of extraction worker threads
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Capacity of the bounded work and delivery channels
    #[arg(long, value_name = "N")]
    pub channel_capacity: Option<usize>,

    /// Follow symbolic links while scanning
    #[arg(long)]
    pub follow_links: bool,

    /// Skip HTML files larger than BYTES
    #[arg(long, value_name = "BYTES")]
    pub max_file_size: Option<u64>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print {"classNames": [...]} on stdout
    #[arg(long)]
    pub json: bool,

    /// Emit log events as JSON lines
    #[arg(long)]
    pub structured_logs: bool,

    /// Only log errors and suppress the warning summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Environment defaults, then the config file, then flags
    pub fn resolve_config(&self) -> Result<AnalyzerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::load(path)?,
            None => AnalyzerConfig::default(),
        };

        if let Some(workers) = self.threads {
            config.workers = workers;
        }
        if let Some(capacity) = self.channel_capacity {
            config.channel_capacity = capacity;
        }
        if self.follow_links {
            config.follow_links = true;
        }
        if let Some(limit) = self.max_file_size {
            config.max_file_size = Some(limit);
        }
        if self.structured_logs {
            config.logging.structured = true;
        }
        if self.quiet {
            config.logging.min_level = LogLevel::Error;
        } else if self.verbose > 0 {
            config.logging.min_level = LogLevel::Debug;
        }

        config.validate()?;
        Ok(config)
    }

    /// Whether the log level was set explicitly on the command line
    pub fn overrides_log_level(&self) -> bool {
        self.quiet || self.verbose > 0
    }
}
