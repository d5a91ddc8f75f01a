//! Logging service and logger backends

use super::codes::Code;
use super::events::{LogEvent, LogLevel};
use crate::config::runtime::LoggingPreferences;
use std::sync::{Arc, Mutex, MutexGuard};

/// Destination for log events
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level-filtering front for a logger backend
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Build the service described by the logging preferences
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        let logger: Arc<dyn Logger> = if preferences.structured {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(FacadeLogger)
        };

        Self::new(logger, preferences.min_level)
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_warning_with_code(&self, warning_code: Code, message: &str) {
        self.log_event(LogEvent::warning_with_code(warning_code, message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Text logger forwarding to the `log` facade
pub struct FacadeLogger;

impl Logger for FacadeLogger {
    fn log(&self, event: &LogEvent) {
        log::log!(
            target: "css_analyzer",
            event.level.to_facade_level(),
            "{}",
            event.format()
        );
    }
}

/// JSON-lines logger forwarding to the `log` facade
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        let line = event.format_json().unwrap_or_else(|_| event.format());
        log::log!(
            target: "css_analyzer",
            event.level.to_facade_level(),
            "{}",
            line
        );
    }
}

/// Fans a single event out to several loggers
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
}

impl MultiLogger {
    pub fn new(loggers: Vec<Arc<dyn Logger>>) -> Self {
        Self { loggers }
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        for logger in &self.loggers {
            logger.log(event);
        }
    }
}

/// In-memory logger for tests and embedding
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn events(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn clear(&self) {
        self.events().clear();
    }

    pub fn event_count(&self) -> usize {
        self.events().len()
    }

    pub fn get_warnings(&self) -> Vec<LogEvent> {
        self.events()
            .iter()
            .filter(|e| e.is_warning())
            .cloned()
            .collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.events()
            .iter()
            .any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.events().iter().any(|e| e.is_info() && e.code == code)
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        self.events().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_level_filtering() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Warning);

        service.log_debug("hidden");
        service.log_info("hidden");
        service.log_warning_with_code(codes::document::OPEN_FAILED, "visible");
        service.log_error(codes::sink::DESTINATION_WRITE_FAILED, "visible");

        assert_eq!(memory.event_count(), 2);
        assert_eq!(memory.get_warnings().len(), 1);
        assert!(memory.has_error_with_code(codes::sink::DESTINATION_WRITE_FAILED));
    }

    #[test]
    fn test_success_events_are_info() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Info);

        service.log_success(codes::success::ANALYSIS_COMPLETED, "done");

        assert!(memory.has_success_with_code(codes::success::ANALYSIS_COMPLETED));
        assert!(!memory.has_success_with_code(codes::success::SCAN_COMPLETED));
    }

    #[test]
    fn test_multi_logger_fans_out() {
        let first = Arc::new(MemoryLogger::new());
        let second = Arc::new(MemoryLogger::new());
        let multi = MultiLogger::new(vec![first.clone(), second.clone()]);

        multi.log(&LogEvent::info("hello"));

        assert_eq!(first.event_count(), 1);
        assert_eq!(second.event_count(), 1);

        first.clear();
        assert_eq!(first.event_count(), 0);
    }

    #[test]
    fn test_from_preferences_respects_level() {
        let preferences = LoggingPreferences {
            min_level: LogLevel::Error,
            structured: true,
        };
        let service = LoggingService::from_preferences(&preferences);

        assert!(service.should_log(LogLevel::Error));
        assert!(!service.should_log(LogLevel::Warning));
    }
}
