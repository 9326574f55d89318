//! Error types for skysift-core.
//!
//! Two families live here:
//!
//! - [`Error`]: local failures (bad criteria input, configuration, I/O).
//! - [`TransportError`]: the typed failure returned by every network stage
//!   (search and hydration). It is `Clone` so a single in-flight request can
//!   hand the same failure to every waiter.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for skysift-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building criteria or loading configuration.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A date/time bound could not be parsed.
    #[error("Invalid timestamp '{input}': {message}")]
    InvalidTimestamp {
        /// Raw input as given by the caller.
        input: String,
        /// What went wrong.
        message: String,
    },

    /// A facet value was not recognised.
    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue {
        /// Facet name.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic.
        message: String,
    },

    /// I/O error without path context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a specific file.
    #[error("I/O error at {}: {source}", .path.display())]
    IoWithPath {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates an invalid-value error for the given facet.
    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidValue {
            field,
            value: value.into(),
        }
    }

    /// Creates an invalid-timestamp error.
    pub fn invalid_timestamp(input: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidTimestamp {
            input: input.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// TransportError
// ============================================================================

/// Classification of a transport failure.
///
/// Mirrors the status values a fetch layer reports: a numeric HTTP status
/// when the backend answered, or a symbolic status when it did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportStatus {
    /// Backend answered with a non-success HTTP status.
    Http(u16),
    /// Request never completed (connection refused, DNS, TLS, ...).
    Fetch,
    /// Response arrived but could not be decoded.
    Parse,
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "{code}"),
            Self::Fetch => write!(f, "FETCH_ERROR"),
            Self::Parse => write!(f, "PARSING_ERROR"),
        }
    }
}

/// Structured `{status, message}` failure from the search or hydration call.
///
/// Never retried automatically; the caller decides whether to show a stale
/// result, an error banner, or offer a manual retry.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{status}: {message}")]
pub struct TransportError {
    /// Failure classification.
    pub status: TransportStatus,
    /// Human-readable detail (response body or client error text).
    pub message: String,
}

impl TransportError {
    /// Backend returned a non-success status.
    pub fn http(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: TransportStatus::Http(code),
            message: message.into(),
        }
    }

    /// Request did not complete.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self {
            status: TransportStatus::Fetch,
            message: message.into(),
        }
    }

    /// Response body could not be decoded.
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            status: TransportStatus::Parse,
            message: message.into(),
        }
    }

    /// HTTP status code, if the backend answered.
    pub fn http_status(&self) -> Option<u16> {
        match self.status {
            TransportStatus::Http(code) => Some(code),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
