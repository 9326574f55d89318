//! Search gateway trait and `/feed` wire types.
//!
//! A gateway executes one compiled request against the index and returns
//! lightweight [`PostReference`]s in backend rank order. It never re-sorts
//! and never retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skysift_core::{PostReference, TransportError};
use skysift_query::CompiledRequest;

/// One entry of the feed skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonItem {
    /// `at://` URI of the matching post.
    pub post: String,
}

/// The `/feed` response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSkeleton {
    /// Matching posts, best first.
    #[serde(default)]
    pub feed: Vec<SkeletonItem>,

    /// Pagination cursor, if the index returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl FeedSkeleton {
    /// References in rank order.
    pub fn into_references(self) -> Vec<PostReference> {
        self.feed
            .into_iter()
            .map(|item| PostReference::new(item.post))
            .collect()
    }
}

/// Executes compiled requests against the search index.
///
/// # Async
///
/// `search` performs exactly one network call per invocation.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Execute a search.
    ///
    /// Returns references ordered as the index ranked them.
    async fn search(&self, request: &CompiledRequest)
    -> Result<Vec<PostReference>, TransportError>;

    /// Gateway name for diagnostics.
    fn name(&self) -> &str;
}
