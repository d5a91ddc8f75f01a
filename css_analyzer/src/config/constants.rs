//! Compile-time limits and defaults

pub mod scanning {
    /// Suffix a file name must end with to be analyzed; matched case-sensitively
    pub const HTML_SUFFIX: &str = ".html";
}

pub mod document {
    /// Attribute whose value holds class tokens
    pub const CLASS_ATTRIBUTE: &str = "class";

    /// Upper bound accepted for `max_file_size` (256MB)
    pub const MAX_FILE_SIZE_CEILING: u64 = 256 * 1024 * 1024;
}

pub mod pipeline {
    /// Delivery channel capacity; bounds buffered per-file batches
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

    pub const MAX_CHANNEL_CAPACITY: usize = 1_000_000;

    pub const MAX_WORKERS: usize = 512;

    /// Prefix for worker thread names
    pub const WORKER_THREAD_PREFIX: &str = "css-extract";

    pub const SCANNER_THREAD_NAME: &str = "css-scan";
}

pub mod logging {
    /// Per-file cap on diagnostics kept by a collector
    pub const MAX_EVENTS_PER_FILE: usize = 100;
}
