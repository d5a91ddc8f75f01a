//! Diagnostic codes and their classification metadata
//!
//! Single source of truth for every code the analyzer emits, together with the
//! category, severity and recovery behaviour attached to it.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code wrapper shared by error, warning and success events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata attached to a code
#[derive(Debug, Clone)]
pub struct CodeMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl CodeMetadata {
    const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const WORKER_PANICKED: Code = Code::new("ERR002");
    pub const INCOMPLETE_DRAIN: Code = Code::new("ERR003");
}

/// Directory traversal codes
pub mod traversal {
    use super::Code;

    pub const ROOT_ENUMERATION_FAILED: Code = Code::new("E001");
    pub const SUB_PATH_UNREADABLE: Code = Code::new("E002");
}

/// Per-document codes
pub mod document {
    use super::Code;

    pub const OPEN_FAILED: Code = Code::new("E010");
    pub const INVALID_ENCODING: Code = Code::new("E011");
    pub const FILE_TOO_LARGE: Code = Code::new("E012");
}

/// Output sink codes
pub mod sink {
    use super::Code;

    pub const DESTINATION_CREATE_FAILED: Code = Code::new("E020");
    pub const DESTINATION_WRITE_FAILED: Code = Code::new("E021");
}

/// Configuration codes
pub mod config {
    use super::Code;

    pub const INVALID_CONFIGURATION: Code = Code::new("E030");
    pub const CONFIG_FILE_UNREADABLE: Code = Code::new("E031");
}

/// Run control codes
pub mod run {
    use super::Code;

    pub const CANCELLED: Code = Code::new("E040");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const ANALYSIS_COMPLETED: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const SCAN_COMPLETED: Code = Code::new("I007");
    pub const RESULT_PERSISTED: Code = Code::new("I010");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static CODE_REGISTRY: OnceLock<HashMap<&'static str, CodeMetadata>> = OnceLock::new();

fn get_code_registry() -> &'static HashMap<&'static str, CodeMetadata> {
    CODE_REGISTRY.get_or_init(|| {
        let entries = [
            CodeMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal error",
                "File a bug report with the failing input tree",
            ),
            CodeMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "An extraction worker panicked before completing its file",
                "Re-run with --threads 1 to isolate the offending document",
            ),
            CodeMetadata::new(
                "ERR003",
                "System",
                Severity::Critical,
                false,
                true,
                "Fewer file results were drained than files were dispatched",
                "File a bug report; the result was discarded",
            ),
            CodeMetadata::new(
                "E001",
                "Traversal",
                Severity::Critical,
                false,
                true,
                "The root directory could not be enumerated",
                "Check that the root exists and is readable",
            ),
            CodeMetadata::new(
                "E002",
                "Traversal",
                Severity::Low,
                true,
                false,
                "A directory below the root could not be enumerated",
                "Check permissions on the reported path",
            ),
            CodeMetadata::new(
                "E010",
                "Document",
                Severity::Medium,
                true,
                false,
                "An HTML file could not be opened or read",
                "Check permissions on the reported file",
            ),
            CodeMetadata::new(
                "E011",
                "Document",
                Severity::Medium,
                true,
                false,
                "An HTML file is not valid UTF-8",
                "Re-encode the file as UTF-8",
            ),
            CodeMetadata::new(
                "E012",
                "Document",
                Severity::Low,
                true,
                false,
                "An HTML file exceeds the configured size limit",
                "Raise max_file_size or remove the limit",
            ),
            CodeMetadata::new(
                "E020",
                "Sink",
                Severity::Critical,
                false,
                true,
                "The output destination could not be created",
                "Check that the destination directory exists and is writable",
            ),
            CodeMetadata::new(
                "E021",
                "Sink",
                Severity::Critical,
                false,
                true,
                "The output destination could not be written",
                "Check free space and permissions on the destination",
            ),
            CodeMetadata::new(
                "E030",
                "Configuration",
                Severity::High,
                false,
                true,
                "A configuration value is outside its allowed range",
                "Correct the reported field",
            ),
            CodeMetadata::new(
                "E031",
                "Configuration",
                Severity::High,
                false,
                true,
                "The configuration file could not be read or parsed",
                "Check the path and TOML syntax of the configuration file",
            ),
            CodeMetadata::new(
                "E040",
                "Run",
                Severity::High,
                true,
                true,
                "The analysis was cancelled before completion",
                "Re-run the analysis",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_code_metadata(code: &str) -> Option<&'static CodeMetadata> {
    get_code_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if the condition is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if the condition aborts the run
pub fn requires_halt(code: &str) -> bool {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for a code
pub fn get_description(code: &str) -> &'static str {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for a code
pub fn get_action(code: &str) -> &'static str {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category for a code
pub fn get_category(code: &str) -> &'static str {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
