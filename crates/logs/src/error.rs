//! Error types for log search operations.

use std::io;

use thiserror::Error;

/// Errors that can occur while building or driving a log search.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be resolved to a readable file inside the
    /// logs directory. Raised at construction, never mid-stream.
    #[error("invalid search: {0}")]
    InvalidSearch(String),

    /// A line, or an unterminated run of bytes, grew past the configured
    /// maximum line length. Fatal for the search.
    #[error("line exceeded the maximum length of {max} bytes")]
    LineOverflow {
        /// The configured maximum line length.
        max: usize,
    },

    /// An underlying read failed with a non-EOF error. Fatal for the
    /// search. A premature EOF is not an error; it ends the stream
    /// cleanly.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for log search operations.
pub type Result<T> = std::result::Result<T, Error>;
