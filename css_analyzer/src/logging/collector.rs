//! Per-run diagnostic collection with cargo-style output
//!
//! A collector belongs to exactly one analysis run. The aggregator is its only
//! writer, so it needs no interior locking.

use super::events::LogEvent;
use crate::config::constants::logging::MAX_EVENTS_PER_FILE;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

/// Counts over the collected diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub files_with_diagnostics: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub dropped_events: usize,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Diagnostics grouped by the file they concern
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    file_events: BTreeMap<PathBuf, Vec<LogEvent>>,
    dropped_events: usize,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event for a specific file
    pub fn record_event(&mut self, file_path: &Path, event: LogEvent) {
        let events = self.file_events.entry(file_path.to_path_buf()).or_default();

        if events.len() < MAX_EVENTS_PER_FILE {
            events.push(event);
        } else {
            self.dropped_events += 1;
        }
    }

    pub fn file_events(&self, file_path: &Path) -> &[LogEvent] {
        self.file_events
            .get(file_path)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All events, ordered by file path
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &LogEvent)> {
        self.file_events
            .iter()
            .flat_map(|(path, events)| events.iter().map(move |event| (path.as_path(), event)))
    }

    pub fn is_empty(&self) -> bool {
        self.file_events.is_empty()
    }

    pub fn total_warnings(&self) -> usize {
        self.iter().filter(|(_, e)| e.is_warning()).count()
    }

    pub fn total_errors(&self) -> usize {
        self.iter().filter(|(_, e)| e.is_error()).count()
    }

    pub fn summary(&self) -> ProcessingSummary {
        ProcessingSummary {
            files_with_diagnostics: self.file_events.len(),
            total_errors: self.total_errors(),
            total_warnings: self.total_warnings(),
            dropped_events: self.dropped_events,
        }
    }

    /// Render grouped diagnostics the way cargo prints them
    pub fn format_cargo_style(&self) -> String {
        let mut output = String::new();

        for (file_path, events) in &self.file_events {
            if events.is_empty() {
                continue;
            }

            output.push_str(&format!("Checking {}...\n", file_path.display()));

            for event in events {
                let label = if event.is_error() { "error" } else { "warning" };
                output.push_str(&format!(
                    "{}[{}]: {}\n",
                    label,
                    event.code.as_str(),
                    event.message
                ));
                output.push_str(&format!(
                    "  = severity: {}, category: {}\n",
                    event.severity(),
                    event.category()
                ));

                for (key, value) in &event.context {
                    if key != "file" {
                        output.push_str(&format!("  = {}: {}\n", key, value));
                    }
                }

                let action = event.recommended_action();
                if action != "No specific action available" {
                    output.push_str(&format!("  = help: {}\n", action));
                }
            }

            output.push('\n');
        }

        let summary = self.summary();
        if summary.has_errors() {
            output.push_str(&format!("Total errors: {}\n", summary.total_errors));
        }
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
        if summary.dropped_events > 0 {
            output.push_str(&format!(
                "({} further diagnostics suppressed)\n",
                summary.dropped_events
            ));
        }

        output
    }
}
