//! Error types for the HTTP front-end.

use thiserror::Error;

/// Errors that can occur while running the service.
#[derive(Debug, Error)]
pub enum Error {
    /// The server has already been started.
    #[error("the server has already been started")]
    AlreadyStarted,

    /// Failed to bind the listen address.
    #[error("failed to bind listen address: {0}")]
    Bind(#[from] std::io::Error),

    /// The logs directory or tuning arguments are unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failed to install the global tracing subscriber.
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Result alias for server operations.
pub type Result<T> = std::result::Result<T, Error>;
