//! The compiled request envelope sent to the index.

use serde::{Deserialize, Serialize};
use skysift_core::SortOrder;

/// Number of references requested per search.
pub const PAGE_SIZE: u32 = 25;

/// Sort key as understood by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Ascending by creation time.
    Asc,
    /// Descending by creation time.
    Desc,
    /// Index relevance score.
    Relevance,
}

impl From<SortOrder> for SortKey {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Newest => Self::Desc,
            SortOrder::Oldest => Self::Asc,
            SortOrder::Relevance => Self::Relevance,
        }
    }
}

/// Backend-ready query string plus its non-text parameters.
///
/// Serializes to the `/feed` request body. Equality is structural, which
/// is what the pipeline relies on to tell "same search again" from "new
/// search".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompiledRequest {
    /// Query string; never empty.
    #[serde(rename = "q")]
    pub query: String,

    /// Sort keys, most significant first.
    pub sort: Vec<SortKey>,

    /// Maximum references to return.
    pub limit: u32,

    /// Ask the index for score explanations.
    pub debug: bool,

    /// Restrict to these author DIDs.
    #[serde(rename = "dids")]
    pub author_ids: Vec<String>,

    /// Absolute upper bound (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    /// Absolute lower bound (ISO-8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl CompiledRequest {
    /// Returns a copy with the debug flag set.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
