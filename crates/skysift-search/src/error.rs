//! Pipeline error types.

use std::fmt;

use skysift_core::TransportError;
use thiserror::Error;

/// Which network stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The `/feed` search call.
    Search,
    /// The `getPosts` hydration call.
    Hydrate,
}

impl Stage {
    /// Banner text shown above the transport error.
    pub fn banner(self) -> &'static str {
        match self {
            Self::Search => "Error fetching search results",
            Self::Hydrate => "Error fetching posts",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search => write!(f, "search"),
            Self::Hydrate => write!(f, "hydrate"),
        }
    }
}

/// A transport failure tagged with the stage it happened in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {source}", .stage.banner())]
pub struct PipelineError {
    /// Failing stage.
    pub stage: Stage,
    /// Underlying transport failure.
    #[source]
    pub source: TransportError,
}

impl PipelineError {
    /// Failure in the search stage.
    pub fn search(source: TransportError) -> Self {
        Self {
            stage: Stage::Search,
            source,
        }
    }

    /// Failure in the hydration stage.
    pub fn hydrate(source: TransportError) -> Self {
        Self {
            stage: Stage::Hydrate,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_display_names_stage() {
        let search = PipelineError::search(TransportError::fetch("connection refused"));
        assert_eq!(
            search.to_string(),
            "Error fetching search results: FETCH_ERROR: connection refused"
        );

        let hydrate = PipelineError::hydrate(TransportError::http(502, "bad gateway"));
        assert_eq!(
            hydrate.to_string(),
            "Error fetching posts: 502: bad gateway"
        );
        assert_eq!(hydrate.stage.to_string(), "hydrate");
    }
}
