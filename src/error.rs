//! Crate-wide error type.

use thiserror::Error;

use crate::cache::{ConfigError, StoreError};

/// Boxed error returned by transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by a request travelling through the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed to produce a response. Passed through untouched.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The cache store failed. Never downgraded to a cache miss.
    #[error("cache store error: {0}")]
    Store(#[from] StoreError),

    /// Reading a response body failed.
    #[error("body I/O error: {0}")]
    Body(#[from] std::io::Error),

    /// The caching configuration was rejected.
    #[error("invalid cache configuration: {0}")]
    Config(#[from] ConfigError),

    /// The middleware chain ran out without reaching a transport.
    #[error("no transport at the end of the middleware chain")]
    ChainExhausted,
}

impl Error {
    /// Wraps any error raised by a transport.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }
}

/// Result alias used throughout the pipeline.
pub type Result<T, E = Error> = std::result::Result<T, E>;
