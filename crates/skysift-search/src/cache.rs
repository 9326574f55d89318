//! Hydration cache.
//!
//! Turns a ranked list of [`PostReference`]s into a map of full
//! [`PostRecord`]s with one batched fetch per distinct URI set. Results are
//! kept in an LRU keyed by the *contents* of the set, so the same URIs in a
//! different order, or in a freshly allocated list, hit the same entry.
//! Concurrent requests for one set share a single in-flight fetch. The
//! fetch is abandoned, and its slot released, once every caller waiting on
//! it has been dropped.
//!
//! # Usage
//!
//! ```rust,ignore
//! let cache = HydrationCache::new(Arc::new(client));
//! let posts = cache.hydrate(&references).await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use parking_lot::Mutex;
use skysift_client::PostFetcher;
use skysift_core::{PostRecord, PostReference, TransportError};

/// Hydrated posts keyed by `at://` URI.
pub type PostMap = HashMap<String, PostRecord>;

/// Number of URI sets kept when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 16;

type HydrateResult = Result<Arc<PostMap>, TransportError>;
type SharedFetch = Shared<BoxFuture<'static, HydrateResult>>;
type InFlightMap = HashMap<UriSet, InFlight>;

// ============================================================================
// UriSet
// ============================================================================

/// Sorted, de-duplicated, non-empty set of post URIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UriSet(Vec<String>);

impl UriSet {
    /// Build a set from references. `None` when there is nothing to hydrate.
    pub fn from_references(references: &[PostReference]) -> Option<Self> {
        Self::from_uris(references.iter().map(|r| r.uri.as_str()))
    }

    /// Build a set from raw URIs. `None` when the input is empty.
    pub fn from_uris<I, S>(uris: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut uris: Vec<String> = uris.into_iter().map(Into::into).collect();
        if uris.is_empty() {
            return None;
        }
        uris.sort();
        uris.dedup();
        Some(Self(uris))
    }

    /// URIs in sorted order.
    pub fn uris(&self) -> &[String] {
        &self.0
    }

    /// Number of distinct URIs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; an empty set is never constructed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// HydrationCache
// ============================================================================

/// Shared, de-duplicating cache in front of a [`PostFetcher`].
pub struct HydrationCache {
    fetcher: Arc<dyn PostFetcher>,
    entries: Mutex<LruCache<UriSet, Arc<PostMap>>>,
    in_flight: Mutex<InFlightMap>,
}

/// A pending fetch and the number of callers awaiting it.
struct InFlight {
    fetch: SharedFetch,
    waiters: usize,
}

/// Registration of one caller on an in-flight fetch.
///
/// Dropping the last waiter of a fetch that never completed removes its
/// slot, so a cancelled hydration does not pin the map entry.
struct Waiter<'a> {
    in_flight: &'a Mutex<InFlightMap>,
    set: UriSet,
    fetch: SharedFetch,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock();
        let abandoned = match in_flight.get_mut(&self.set) {
            Some(entry) if entry.fetch.ptr_eq(&self.fetch) => {
                entry.waiters = entry.waiters.saturating_sub(1);
                entry.waiters == 0
            }
            _ => false,
        };
        if abandoned {
            log::debug!("abandoning hydration ({} URIs)", self.set.len());
            in_flight.remove(&self.set);
        }
    }
}

impl HydrationCache {
    /// Cache with [`DEFAULT_CAPACITY`] entries.
    pub fn new(fetcher: Arc<dyn PostFetcher>) -> Self {
        Self::with_capacity(fetcher, DEFAULT_CAPACITY)
    }

    /// Cache holding up to `capacity` URI sets (minimum 1).
    pub fn with_capacity(fetcher: Arc<dyn PostFetcher>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            fetcher,
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Hydrate `references`.
    ///
    /// An empty slice returns an empty map without touching the network.
    /// URIs the fetcher does not return are simply absent from the map.
    pub async fn hydrate(&self, references: &[PostReference]) -> HydrateResult {
        match UriSet::from_references(references) {
            Some(set) => self.hydrate_set(set).await,
            None => Ok(Arc::new(PostMap::new())),
        }
    }

    /// Hydrate a prepared URI set.
    pub async fn hydrate_set(&self, set: UriSet) -> HydrateResult {
        if let Some(hit) = self.cached(&set) {
            log::debug!("hydration cache hit ({} URIs)", set.len());
            return Ok(hit);
        }

        let fetch = {
            let mut in_flight = self.in_flight.lock();
            // A fetch may have completed since the lookup above.
            if let Some(hit) = self.entries.lock().get(&set).cloned() {
                return Ok(hit);
            }
            match in_flight.get_mut(&set) {
                Some(existing) => {
                    log::debug!("joining in-flight hydration ({} URIs)", set.len());
                    existing.waiters += 1;
                    existing.fetch.clone()
                }
                None => {
                    let fetch = fetch_posts(Arc::clone(&self.fetcher), set.clone())
                        .boxed()
                        .shared();
                    let entry = InFlight {
                        fetch: fetch.clone(),
                        waiters: 1,
                    };
                    in_flight.insert(set.clone(), entry);
                    fetch
                }
            }
        };
        let waiter = Waiter {
            in_flight: &self.in_flight,
            set: set.clone(),
            fetch: fetch.clone(),
        };

        let result = fetch.await;

        {
            let mut in_flight = self.in_flight.lock();
            if in_flight
                .get(&set)
                .is_some_and(|current| current.fetch.ptr_eq(&waiter.fetch))
            {
                in_flight.remove(&set);
                if let Ok(map) = &result {
                    self.entries.lock().put(set, Arc::clone(map));
                }
            }
        }
        drop(waiter);
        result
    }

    /// Cached map for `set`, marking it most recently used.
    pub fn cached(&self, set: &UriSet) -> Option<Arc<PostMap>> {
        self.entries.lock().get(set).cloned()
    }

    /// Whether `set` is cached, without touching recency.
    pub fn contains(&self, set: &UriSet) -> bool {
        self.entries.lock().contains(set)
    }

    /// Drop one entry so the next request refetches it.
    pub fn invalidate(&self, set: &UriSet) -> bool {
        self.entries.lock().pop(set).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of cached sets.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl fmt::Debug for HydrationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (entries, capacity) = {
            let entries = self.entries.lock();
            (entries.len(), entries.cap())
        };
        let in_flight = self.in_flight.lock().len();
        f.debug_struct("HydrationCache")
            .field("entries", &entries)
            .field("capacity", &capacity)
            .field("in_flight", &in_flight)
            .finish()
    }
}

async fn fetch_posts(fetcher: Arc<dyn PostFetcher>, set: UriSet) -> HydrateResult {
    log::debug!("hydrating {} URIs", set.len());
    let posts = fetcher.get_posts(set.uris()).await?;
    let map: PostMap = posts.into_iter().map(|p| (p.uri.clone(), p)).collect();
    if map.len() < set.len() {
        log::debug!(
            "{} of {} URIs were not returned",
            set.len() - map.len(),
            set.len()
        );
    }
    Ok(Arc::new(map))
}

// ============================================================================
// Tests
// ============================================================================
