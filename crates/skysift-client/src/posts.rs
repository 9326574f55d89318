//! Batched post hydration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skysift_core::{PostRecord, TransportError};

/// Most URIs the AppView accepts in one `getPosts` call.
pub const MAX_URIS_PER_CALL: usize = 25;

/// The `app.bsky.feed.getPosts` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPostsResponse {
    /// Hydrated posts. Deleted or blocked posts are simply absent.
    #[serde(default)]
    pub posts: Vec<PostRecord>,
}

/// Fetches full post records for a batch of URIs in a single call.
#[async_trait]
pub trait PostFetcher: Send + Sync {
    /// Hydrate `uris`.
    ///
    /// Callers must not pass an empty slice; the AppView rejects it.
    async fn get_posts(&self, uris: &[String]) -> Result<Vec<PostRecord>, TransportError>;
}
