//! Result assembly.
//!
//! Merges the index's ranked references with the hydrated post map. Rank
//! order always comes from the references; the map only decides which
//! posts survive.

use serde::Serialize;
use skysift_core::{PostRecord, PostReference};

use crate::cache::PostMap;

/// Why a finished search has nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmptyReason {
    /// The index matched nothing.
    NoMatches,
    /// The index matched posts but none could be hydrated.
    NothingHydrated,
}

impl EmptyReason {
    /// User-facing message for `query`.
    pub fn message(self, query: &str) -> String {
        match self {
            Self::NoMatches => format!("No posts found matching \"{query}\""),
            Self::NothingHydrated => {
                format!("Posts matching \"{query}\" were found but could not be loaded")
            }
        }
    }
}

/// Ordered, hydrated results of one search run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    /// Hydrated posts in rank order.
    pub posts: Vec<PostRecord>,
    /// How many references the index returned.
    pub matched: usize,
}

impl ResultSet {
    /// Whether there is nothing to display.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Number of displayable posts.
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// References the index returned that did not hydrate.
    pub fn missing(&self) -> usize {
        self.matched.saturating_sub(self.posts.len())
    }

    /// Which empty state applies, if any.
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if !self.posts.is_empty() {
            None
        } else if self.matched == 0 {
            Some(EmptyReason::NoMatches)
        } else {
            Some(EmptyReason::NothingHydrated)
        }
    }
}

/// Walk `references` in rank order, keeping those present in `posts`.
pub fn assemble(references: &[PostReference], posts: &PostMap) -> ResultSet {
    let ordered: Vec<PostRecord> = references
        .iter()
        .filter_map(|r| posts.get(&r.uri).cloned())
        .collect();

    if ordered.len() < references.len() {
        log::debug!(
            "assembled {} of {} references",
            ordered.len(),
            references.len()
        );
    }

    ResultSet {
        posts: ordered,
        matched: references.len(),
    }
}

// ============================================================================
// Tests
// ============================================================================
