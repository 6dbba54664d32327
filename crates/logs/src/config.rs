//! Configuration for the log search engine.

use std::path::PathBuf;

/// Default bytes read per page: 1 MiB.
pub const DEFAULT_PAGE_LENGTH: usize = 1 << 20;

/// Default maximum line length, including the trailing newline: 64 KiB.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1 << 16;

/// Process-wide tuning for log searches.
///
/// Peak heap per search is bounded by one page plus two line buffers, so
/// `page_length` much larger than `max_line_length` amortizes syscalls
/// while `max_line_length` caps worst-case memory.
#[derive(Debug, Clone)]
pub struct LogsConfig {
    /// Root directory containing the served log files.
    pub logs_dir: PathBuf,

    /// Bytes read from the file per page. Must be positive.
    pub page_length: usize,

    /// Upper bound on the length of a single line, including its trailing
    /// newline. Must be positive.
    pub max_line_length: usize,
}

impl LogsConfig {
    /// Creates a configuration for `logs_dir` with default tuning.
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            page_length: DEFAULT_PAGE_LENGTH,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Builder for [`LogsConfig`].
pub struct LogsConfigBuilder {
    config: LogsConfig,
}

impl LogsConfigBuilder {
    /// Starts a builder rooted at `logs_dir`.
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: LogsConfig::new(logs_dir),
        }
    }

    /// Sets the page length in bytes.
    #[must_use]
    pub fn page_length(mut self, length: usize) -> Self {
        self.config.page_length = length;
        self
    }

    /// Sets the maximum line length in bytes.
    #[must_use]
    pub fn max_line_length(mut self, length: usize) -> Self {
        self.config.max_line_length = length;
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> LogsConfig {
        self.config
    }
}
