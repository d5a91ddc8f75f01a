//! Concurrent fan-out over discovered files and single-owner fan-in of tokens
//!
//! Thread layout for one run:
//! - a scanner thread walks the tree and feeds the bounded work queue
//! - `workers` extraction threads each take a path, extract it and send one
//!   delivery per file
//! - the calling thread is the only consumer of the delivery channel and the
//!   only writer of the token set
//!
//! The delivery channel disconnects once the scanner and every worker have
//! dropped their senders. After that the consumer joins all threads and
//! checks that one delivery arrived per dispatched file before building the
//! result.

use crate::cancellation::CancellationToken;
use crate::config::constants::pipeline::{SCANNER_THREAD_NAME, WORKER_THREAD_PREFIX};
use crate::config::AnalyzerConfig;
use crate::document::{self, DocumentParser, TokenStream};
use crate::error::AnalyzeError;
use crate::logging::{codes, DiagnosticCollector};
use crate::result::{AnalysisReport, AnalysisResult, AnalysisStats, AnalysisWarning};
use crate::scanner::{DirectoryScanner, ScanItem};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread::{self, Scope, ScopedJoinHandle};

/// Message from the scanner or a worker to the consumer
#[derive(Debug)]
enum Delivery {
    /// A file was extracted
    Tokens { path: PathBuf, tokens: TokenStream },
    /// A file was dispatched but could not be extracted
    Skipped(AnalysisWarning),
    /// The scanner could not enumerate a sub-path
    Traversal(AnalysisWarning),
}

/// Set of every distinct token seen during one run
#[derive(Debug, Default)]
pub struct TokenSet {
    tokens: HashSet<String>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert every token of a stream, returning how many were new
    pub fn extend_from(&mut self, stream: TokenStream) -> usize {
        let before = self.tokens.len();
        self.tokens.extend(stream);
        self.tokens.len() - before
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Consume the set into its sorted form
    pub fn into_result(self) -> AnalysisResult {
        AnalysisResult::from_unsorted(self.tokens)
    }
}

/// Everything the consumer accumulated while draining
#[derive(Default)]
struct Drained {
    tokens: TokenSet,
    stats: AnalysisStats,
    warnings: Vec<AnalysisWarning>,
    diagnostics: DiagnosticCollector,
    delivered: usize,
}

impl Drained {
    fn accept(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Tokens { path, tokens } => {
                self.delivered += 1;
                self.stats.files_processed += 1;
                self.stats.tokens_emitted += tokens.len();

                let emitted = tokens.len();
                let fresh = self.tokens.extend_from(tokens);
                crate::log_debug!("Extracted class tokens",
                    "file" => path.display(),
                    "tokens" => emitted,
                    "new" => fresh
                );
            }
            Delivery::Skipped(warning) => {
                self.delivered += 1;
                self.stats.files_skipped += 1;
                self.record(warning);
            }
            Delivery::Traversal(warning) => self.record(warning),
        }
    }

    fn record(&mut self, warning: AnalysisWarning) {
        crate::log_warning!(
            code = warning.code(),
            "Skipping path",
            "path" => warning.path.display(),
            "reason" => &warning.message
        );
        self.diagnostics.record_event(&warning.path, warning.to_event());
        self.warnings.push(warning);
    }
}

/// Runs the scan, extraction and aggregation stages for one root
pub struct Aggregator {
    config: AnalyzerConfig,
    cancellation: CancellationToken,
}

impl Aggregator {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Analyze every `.html` file under `root`
    ///
    /// Returns only after quiescence: every dispatched file has been accounted
    /// for and every worker has exited.
    pub fn run(&self, root: &Path) -> Result<AnalysisReport, AnalyzeError> {
        self.config.validate()?;

        if self.cancellation.is_cancelled() {
            return Err(AnalyzeError::Cancelled);
        }

        crate::log_info!("Starting class analysis",
            "root" => root.display(),
            "workers" => self.config.workers,
            "channel_capacity" => self.config.channel_capacity
        );

        let (drained, dispatched) = thread::scope(|scope| self.fan_out_fan_in(scope, root))?;

        if self.cancellation.is_cancelled() {
            return Err(AnalyzeError::Cancelled);
        }

        if drained.delivered != dispatched {
            crate::log_error!(
                codes::system::INCOMPLETE_DRAIN,
                "Not every dispatched file reported back",
                "dispatched" => dispatched,
                "delivered" => drained.delivered
            );
            return Err(AnalyzeError::Incomplete {
                dispatched,
                delivered: drained.delivered,
            });
        }

        let Drained {
            tokens,
            mut stats,
            warnings,
            diagnostics,
            ..
        } = drained;

        let result = tokens.into_result();
        stats.files_discovered = dispatched;
        stats.unique_tokens = result.len();

        Ok(AnalysisReport {
            result,
            stats,
            warnings,
            diagnostics,
        })
    }

    /// Spawn the scanner and workers, drain deliveries, then join everything
    ///
    /// Channels are created inside the scope so an early return drops the
    /// consumer side and unblocks any thread still sending.
    fn fan_out_fan_in<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        root: &'env Path,
    ) -> Result<(Drained, usize), AnalyzeError> {
        let capacity = self.config.channel_capacity;
        let (work_tx, work_rx) = bounded::<PathBuf>(capacity);
        let (delivery_tx, delivery_rx) = bounded::<Delivery>(capacity);

        let scanner = self.spawn_scanner(scope, root, work_tx, delivery_tx.clone())?;

        let parser = DocumentParser::new(self.config.max_file_size);
        let mut workers = Vec::with_capacity(self.config.workers);
        for id in 0..self.config.workers {
            let name = format!("{}-{}", WORKER_THREAD_PREFIX, id);
            let handle = self.spawn_worker(
                scope,
                &name,
                parser,
                work_rx.clone(),
                delivery_tx.clone(),
            )?;
            workers.push((name, handle));
        }

        // Only the scanner and workers may keep the channels open
        drop(work_rx);
        drop(delivery_tx);

        let drained = drain(delivery_rx);

        // Join every thread before reporting anything
        let scan_outcome = scanner.join();
        let mut first_panic = None;
        for (name, handle) in workers {
            if handle.join().is_err() && first_panic.is_none() {
                first_panic = Some(name);
            }
        }

        let dispatched = match scan_outcome {
            Ok(outcome) => outcome?,
            Err(_) => return Err(panicked(SCANNER_THREAD_NAME)),
        };

        if let Some(name) = first_panic {
            return Err(panicked(&name));
        }

        Ok((drained, dispatched))
    }

    fn spawn_scanner<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        root: &'env Path,
        work_tx: Sender<PathBuf>,
        delivery_tx: Sender<Delivery>,
    ) -> Result<ScopedJoinHandle<'scope, Result<usize, AnalyzeError>>, AnalyzeError> {
        let scanner = DirectoryScanner::new(root)
            .with_follow_links(self.config.follow_links)
            .with_cancellation(self.cancellation.clone());

        thread::Builder::new()
            .name(SCANNER_THREAD_NAME.to_string())
            .spawn_scoped(scope, move || {
                let mut dispatched = 0usize;

                scanner.scan(|item| match item {
                    ScanItem::File(path) => {
                        if work_tx.send(path).is_err() {
                            return false;
                        }
                        dispatched += 1;
                        true
                    }
                    ScanItem::Warning(warning) => {
                        delivery_tx.send(Delivery::Traversal(warning)).is_ok()
                    }
                })?;

                Ok(dispatched)
            })
            .map_err(|source| AnalyzeError::Spawn {
                thread: SCANNER_THREAD_NAME.to_string(),
                source,
            })
    }

    fn spawn_worker<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        name: &str,
        parser: DocumentParser,
        work_rx: Receiver<PathBuf>,
        delivery_tx: Sender<Delivery>,
    ) -> Result<ScopedJoinHandle<'scope, ()>, AnalyzeError> {
        let cancellation = self.cancellation.clone();

        thread::Builder::new()
            .name(name.to_string())
            .spawn_scoped(scope, move || {
                for path in work_rx.iter() {
                    if cancellation.is_cancelled() {
                        break;
                    }

                    let delivery = match document::extract_file(&parser, &path) {
                        Ok(tokens) => Delivery::Tokens { path, tokens },
                        Err(err) => Delivery::Skipped(err.into()),
                    };

                    if delivery_tx.send(delivery).is_err() {
                        break;
                    }
                }
            })
            .map_err(|source| AnalyzeError::Spawn {
                thread: name.to_string(),
                source,
            })
    }
}

/// Single consumer loop; ends when every sender has been dropped
fn drain(delivery_rx: Receiver<Delivery>) -> Drained {
    let mut drained = Drained::default();
    for delivery in delivery_rx.iter() {
        drained.accept(delivery);
    }
    drained
}

fn panicked(thread: &str) -> AnalyzeError {
    crate::log_error!(
        codes::system::WORKER_PANICKED,
        "Pipeline thread panicked",
        "thread" => thread
    );
    AnalyzeError::WorkerPanicked {
        worker: thread.to_string(),
    }
}
