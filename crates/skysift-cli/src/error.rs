//! Error types for skysift-cli

use thiserror::Error;

/// Result type alias for skysift-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in skysift-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from skysift-core
    #[error("Core error: {0}")]
    Core(#[from] skysift_core::Error),

    /// Error from skysift-client
    #[error("Client error: {0}")]
    Client(#[from] skysift_client::Error),

    /// A search run failed
    #[error("{0}")]
    Pipeline(#[from] skysift_search::PipelineError),

    /// The language listing could not be fetched
    #[error("Error fetching languages: {0}")]
    Transport(#[from] skysift_core::TransportError),

    /// JSON output could not be produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
