//! Structured logging for the analyzer
//!
//! Events carry a diagnostic [`Code`] and key/value context. They are routed
//! through an optional process-wide [`LoggingService`]. Without one, events go
//! straight to the `log` facade so library users keep their own backend.

pub mod codes;
pub mod collector;
pub mod events;
#[macro_use]
pub mod macros;
pub mod service;

use crate::config::runtime::LoggingPreferences;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{DiagnosticCollector, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{
    FacadeLogger, Logger, LoggingService, MemoryLogger, MultiLogger, StructuredLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Install the process-wide logging service built from preferences
pub fn init_global_logging(preferences: &LoggingPreferences) -> Result<(), String> {
    let service = Arc::new(LoggingService::from_preferences(preferences));
    init_global_logging_with_service(service.clone())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Logging initialized",
    ));

    Ok(())
}

/// Install a caller-built service
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

/// Route an event to the global service, or to the `log` facade
pub fn emit(event: LogEvent) {
    match try_get_global_logger() {
        Some(service) => service.log_event(event),
        None => FacadeLogger.log(&event),
    }
}

/// Whether debug events would be delivered anywhere
pub fn debug_enabled() -> bool {
    match try_get_global_logger() {
        Some(service) => service.should_log(LogLevel::Debug),
        None => log::log_enabled!(target: "css_analyzer", log::Level::Debug),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_do_not_panic_without_backend() {
        let path = std::path::Path::new("site/index.html");

        log_info!("Scanning", "root" => path.display());
        log_warning!(code = codes::document::OPEN_FAILED, "Skipping document", "path" => path.display());
        log_warning!("Plain warning");
        log_error!(codes::system::INTERNAL_ERROR, "Internal failure", "detail" => 42);
        log_success!(codes::success::SCAN_COMPLETED, "Scan done", "files" => 3usize);
        log_debug!("Debug detail", "worker" => 1);
    }

    #[test]
    fn test_second_initialization_fails() {
        let service = Arc::new(LoggingService::new(
            Arc::new(MemoryLogger::new()),
            LogLevel::Error,
        ));

        // The first call may lose a race with another test; the second never succeeds.
        let _ = init_global_logging_with_service(service.clone());
        assert!(is_initialized());
        assert!(init_global_logging_with_service(service).is_err());
    }
}
