//! Error types for skysift-client

use thiserror::Error;

/// Result type alias for skysift-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing a client.
///
/// Request-time failures are reported as
/// [`TransportError`](skysift_core::TransportError) instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from skysift-core
    #[error("Core error: {0}")]
    Core(#[from] skysift_core::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured base URL could not be parsed
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The URL as configured
        url: String,
        /// Parser message
        message: String,
    },
}
