//! Post references and hydrated post records.
//!
//! The index answers a search with [`PostReference`]s only; the renderable
//! [`PostRecord`] comes from a second, batched call. `PostRecord` decodes the
//! AppView `PostView` JSON shape (camelCase keys, counters that may be
//! missing).

use serde::{Deserialize, Serialize};

/// Base URL for post permalinks.
pub const WEB_BASE_URL: &str = "https://bsky.app";

/// Opaque pointer to a matching post. Carries no display data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
pub struct PostReference {
    /// `at://` URI of the post.
    pub uri: String,
}

impl PostReference {
    /// Creates a reference from a post URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

impl From<&str> for PostReference {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

/// Post author as embedded in a hydrated post.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Author DID.
    pub did: String,
    /// Author handle.
    #[serde(default)]
    pub handle: String,
    /// Display name, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Avatar URL, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Author {
    /// Display name, falling back to the handle.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.handle)
    }
}

/// The post record body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostBody {
    /// Post text.
    #[serde(default)]
    pub text: String,
    /// Author-claimed creation time (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Languages declared by the author.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub langs: Vec<String>,
}

/// A moderation label attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Labeller DID.
    #[serde(default)]
    pub src: String,
    /// Label value.
    pub val: String,
}

/// A fully hydrated post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// `at://` URI; the hydration map key.
    pub uri: String,
    /// Content hash of the record.
    #[serde(default)]
    pub cid: String,
    /// Post author.
    pub author: Author,
    /// Record body.
    #[serde(default)]
    pub record: PostBody,
    /// Embed view, kept as raw JSON for the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<serde_json::Value>,
    /// Reply count.
    #[serde(default)]
    pub reply_count: u64,
    /// Repost count.
    #[serde(default)]
    pub repost_count: u64,
    /// Like count.
    #[serde(default)]
    pub like_count: u64,
    /// Quote count.
    #[serde(default)]
    pub quote_count: u64,
    /// When the AppView indexed the post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_at: Option<String>,
    /// Moderation labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl PostRecord {
    /// Bare record with empty body and zero counters.
    pub fn new(uri: impl Into<String>, author: Author) -> Self {
        Self {
            uri: uri.into(),
            cid: String::new(),
            author,
            record: PostBody::default(),
            embed: None,
            reply_count: 0,
            repost_count: 0,
            like_count: 0,
            quote_count: 0,
            indexed_at: None,
            labels: Vec::new(),
        }
    }

    /// Record key: the last segment of the URI.
    pub fn rkey(&self) -> &str {
        self.uri.rsplit('/').next().unwrap_or(&self.uri)
    }

    /// Public permalink for the post.
    pub fn web_url(&self) -> String {
        format!(
            "{WEB_BASE_URL}/profile/{}/post/{}",
            self.author.did,
            self.rkey()
        )
    }

    /// Post text.
    pub fn text(&self) -> &str {
        &self.record.text
    }

    /// Best available timestamp: author-claimed, else index time.
    pub fn timestamp(&self) -> Option<&str> {
        self.record
            .created_at
            .as_deref()
            .or(self.indexed_at.as_deref())
    }

    /// Reference pointing at this post.
    pub fn reference(&self) -> PostReference {
        PostReference::new(self.uri.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
