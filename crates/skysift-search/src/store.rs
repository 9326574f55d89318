//! Owned criteria state.
//!
//! [`CriteriaStore`] holds the currently active compiled request. There is
//! exactly one writer (updates take `&mut self`); any number of readers
//! observe changes through [`watch`] receivers.
//!
//! # Usage
//!
//! ```rust
//! use skysift_core::SearchCriteria;
//! use skysift_search::store::{CriteriaStore, Update};
//!
//! let mut store = CriteriaStore::new();
//! let rx = store.subscribe();
//! assert!(rx.borrow().is_none());
//!
//! let criteria = SearchCriteria::new().with_hashtag("rust");
//! assert_eq!(store.apply(&criteria), Update::Changed);
//! assert_eq!(store.apply(&criteria), Update::Unchanged);
//! assert!(rx.borrow().is_some());
//! ```

use std::fmt;

use chrono::TimeZone;
use skysift_core::SearchCriteria;
use skysift_query::CompiledRequest;
use tokio::sync::watch;

/// Result of writing criteria into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// The compiled request differs from the previous one.
    Changed,
    /// The compiled request is identical to the previous one.
    Unchanged,
}

impl Update {
    /// Returns `true` for [`Update::Changed`].
    pub fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Single-writer holder of the active [`CompiledRequest`].
pub struct CriteriaStore {
    tx: watch::Sender<Option<CompiledRequest>>,
}

impl CriteriaStore {
    /// Empty store: no request configured yet.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Current request, if any.
    pub fn current(&self) -> Option<CompiledRequest> {
        self.tx.borrow().clone()
    }

    /// Compile `criteria` with the local timezone and store the result.
    pub fn apply(&mut self, criteria: &SearchCriteria) -> Update {
        self.set(skysift_query::compile(criteria))
    }

    /// Compile `criteria` in `tz` and store the result.
    pub fn apply_in<Tz: TimeZone>(&mut self, criteria: &SearchCriteria, tz: &Tz) -> Update {
        self.set(skysift_query::compile_in(criteria, tz))
    }

    /// Store an already compiled request.
    ///
    /// Subscribers are only notified when the request actually changes.
    pub fn set(&mut self, request: CompiledRequest) -> Update {
        let changed = self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&request) {
                false
            } else {
                *current = Some(request);
                true
            }
        });
        if changed {
            log::debug!(
                "criteria changed: q={:?}",
                self.tx.borrow().as_ref().map(|r| &r.query)
            );
            Update::Changed
        } else {
            Update::Unchanged
        }
    }

    /// Forget the active request.
    pub fn reset(&mut self) {
        self.tx.send_replace(None);
    }

    /// Subscribe to request changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<CompiledRequest>> {
        self.tx.subscribe()
    }
}

impl Default for CriteriaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CriteriaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CriteriaStore")
            .field("current", &*self.tx.borrow())
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
