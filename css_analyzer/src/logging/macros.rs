//! Logging macros taking a `Code` and `key => value` context
//!
//! Context values may be any `Display` type.

/// Log an error with a code
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::error($code, $message))
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let mut event = $crate::logging::LogEvent::error($code, $message);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};
}

/// Log a warning, optionally with a code
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::warning_with_code($code, $message))
    };

    (code = $code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let mut event = $crate::logging::LogEvent::warning_with_code($code, $message);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};

    ($message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::warning($message))
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let mut event = $crate::logging::LogEvent::warning($message);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};
}

/// Log a success event with a code
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::success($code, $message))
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let mut event = $crate::logging::LogEvent::success($code, $message);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};
}

/// Log an informational message
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::info($message))
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let mut event = $crate::logging::LogEvent::info($message);
        $(
            event = event.with_context($key, &format!("{}", $value));
        )+
        $crate::logging::emit(event)
    }};
}

/// Log a debug message; context is only formatted when debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::emit($crate::logging::LogEvent::debug($message))
        }
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {
        if $crate::logging::debug_enabled() {
            let mut event = $crate::logging::LogEvent::debug($message);
            $(
                event = event.with_context($key, &format!("{}", $value));
            )+
            $crate::logging::emit(event)
        }
    };
}
