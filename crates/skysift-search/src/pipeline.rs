//! The search pipeline.
//!
//! compile → search → hydrate → assemble, with progress published on a
//! [`watch`] channel of [`SearchState`]. Every run takes a fresh generation
//! number; a run that is no longer the latest stops publishing and reports
//! [`RunOutcome::Superseded`], so the last request submitted always wins
//! regardless of which network call finishes first.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::TimeZone;
use lru::LruCache;
use parking_lot::Mutex;
use skysift_client::SearchGateway;
use skysift_core::{PostReference, SearchCriteria};
use skysift_query::CompiledRequest;
use tokio::sync::watch;

use crate::assemble::{ResultSet, assemble};
use crate::cache::{HydrationCache, PostMap, UriSet};
use crate::error::PipelineError;
use crate::store::{CriteriaStore, Update};

/// Number of resolved searches kept when no capacity is given.
pub const DEFAULT_SEARCH_CACHE_CAPACITY: usize = 32;

// ============================================================================
// SearchState
// ============================================================================

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Nothing has been submitted.
    Idle,
    /// Waiting on the index.
    Searching,
    /// Waiting on post hydration.
    Hydrating,
    /// A stage failed.
    Failed(PipelineError),
    /// Results are ready.
    Complete(Arc<ResultSet>),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Searching => write!(f, "searching"),
            Self::Hydrating => write!(f, "hydrating"),
            Self::Failed(err) => write!(f, "failed: {err}"),
            Self::Complete(result) => write!(f, "complete ({} posts)", result.len()),
        }
    }
}

/// Snapshot published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// Run that produced this snapshot (0 before the first run).
    pub generation: u64,
    /// Request being served.
    pub request: Option<CompiledRequest>,
    /// Progress of that request.
    pub phase: Phase,
}

impl SearchState {
    /// Initial state.
    pub fn idle() -> Self {
        Self {
            generation: 0,
            request: None,
            phase: Phase::Idle,
        }
    }

    /// Returns `true` while either network stage is pending.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Searching | Phase::Hydrating)
    }

    /// The failure, if the run failed.
    pub fn error(&self) -> Option<&PipelineError> {
        match &self.phase {
            Phase::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The results, if the run completed.
    pub fn data(&self) -> Option<&Arc<ResultSet>> {
        match &self.phase {
            Phase::Complete(result) => Some(result),
            _ => None,
        }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::idle()
    }
}

/// How a single run ended, from the caller's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The run finished and its results were published.
    Completed(Arc<ResultSet>),
    /// The run failed and the failure was published.
    Failed(PipelineError),
    /// A newer run started; nothing was published.
    Superseded,
    /// Refetch was requested before any request was configured.
    NoRequest,
}

impl RunOutcome {
    /// Returns `true` for [`RunOutcome::Superseded`].
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

// ============================================================================
// SearchPipeline
// ============================================================================

/// Drives searches from criteria to assembled results.
pub struct SearchPipeline {
    gateway: Arc<dyn SearchGateway>,
    hydration: Arc<HydrationCache>,
    searches: Mutex<LruCache<CompiledRequest, Arc<Vec<PostReference>>>>,
    criteria: Mutex<CriteriaStore>,
    generation: AtomicU64,
    state: watch::Sender<SearchState>,
}

impl SearchPipeline {
    /// Pipeline over `gateway`, hydrating through the shared `hydration` cache.
    pub fn new(gateway: Arc<dyn SearchGateway>, hydration: Arc<HydrationCache>) -> Self {
        let (state, _rx) = watch::channel(SearchState::idle());
        Self {
            gateway,
            hydration,
            searches: Mutex::new(LruCache::new(non_zero(DEFAULT_SEARCH_CACHE_CAPACITY))),
            criteria: Mutex::new(CriteriaStore::new()),
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Keep up to `capacity` resolved searches (minimum 1).
    pub fn with_search_cache_capacity(mut self, capacity: usize) -> Self {
        self.searches = Mutex::new(LruCache::new(non_zero(capacity)));
        self
    }

    /// The hydration cache this pipeline shares.
    pub fn hydration(&self) -> &Arc<HydrationCache> {
        &self.hydration
    }

    /// Latest published state.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Subscribe to the active request.
    pub fn subscribe_criteria(&self) -> watch::Receiver<Option<CompiledRequest>> {
        self.criteria.lock().subscribe()
    }

    /// The active request, if any.
    pub fn current_request(&self) -> Option<CompiledRequest> {
        self.criteria.lock().current()
    }

    /// Submit criteria, compiling local times in the process timezone.
    ///
    /// Identical criteria trigger a [`refetch`](Self::refetch).
    pub async fn submit(&self, criteria: &SearchCriteria) -> RunOutcome {
        self.submit_request(skysift_query::compile(criteria)).await
    }

    /// Submit criteria, compiling local times in `tz`.
    pub async fn submit_in<Tz: TimeZone>(&self, criteria: &SearchCriteria, tz: &Tz) -> RunOutcome {
        self.submit_request(skysift_query::compile_in(criteria, tz))
            .await
    }

    /// Submit an already compiled request.
    pub async fn submit_request(&self, request: CompiledRequest) -> RunOutcome {
        let update = self.criteria.lock().set(request.clone());
        match update {
            Update::Changed => self.execute(request, false).await,
            Update::Unchanged => {
                log::debug!("criteria unchanged; refetching");
                self.execute(request, true).await
            }
        }
    }

    /// Run the active request again, bypassing both caches.
    pub async fn refetch(&self) -> RunOutcome {
        let current = self.criteria.lock().current();
        match current {
            Some(request) => self.execute(request, true).await,
            None => RunOutcome::NoRequest,
        }
    }

    /// Run `request` without touching the criteria store.
    ///
    /// Cached searches and hydrations are reused.
    pub async fn run(&self, request: CompiledRequest) -> RunOutcome {
        self.execute(request, false).await
    }

    async fn execute(&self, request: CompiledRequest, fresh: bool) -> RunOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("run {generation}: q={:?} fresh={fresh}", request.query);

        if !self.publish(generation, &request, Phase::Searching) {
            return RunOutcome::Superseded;
        }

        let references = match self.search(&request, fresh).await {
            Ok(references) => references,
            Err(source) => return self.fail(generation, &request, PipelineError::search(source)),
        };

        let posts = match UriSet::from_references(&references) {
            None => Arc::new(PostMap::new()),
            Some(set) => {
                if !self.publish(generation, &request, Phase::Hydrating) {
                    return RunOutcome::Superseded;
                }
                if fresh {
                    self.hydration.invalidate(&set);
                }
                match self.hydration.hydrate_set(set).await {
                    Ok(posts) => posts,
                    Err(source) => {
                        return self.fail(generation, &request, PipelineError::hydrate(source));
                    }
                }
            }
        };

        let result = Arc::new(assemble(&references, &posts));
        if self.publish(generation, &request, Phase::Complete(Arc::clone(&result))) {
            log::info!(
                "run {generation}: {} posts ({} matched)",
                result.len(),
                result.matched
            );
            RunOutcome::Completed(result)
        } else {
            RunOutcome::Superseded
        }
    }

    async fn search(
        &self,
        request: &CompiledRequest,
        fresh: bool,
    ) -> Result<Arc<Vec<PostReference>>, skysift_core::TransportError> {
        if !fresh {
            let hit = self.searches.lock().get(request).cloned();
            if let Some(hit) = hit {
                log::debug!("search cache hit");
                return Ok(hit);
            }
        }

        let references = Arc::new(self.gateway.search(request).await?);
        self.searches
            .lock()
            .put(request.clone(), Arc::clone(&references));
        Ok(references)
    }

    fn fail(&self, generation: u64, request: &CompiledRequest, err: PipelineError) -> RunOutcome {
        if self.publish(generation, request, Phase::Failed(err.clone())) {
            log::warn!("run {generation}: {err}");
            RunOutcome::Failed(err)
        } else {
            RunOutcome::Superseded
        }
    }

    /// Publish `phase` if `generation` is still the latest run.
    fn publish(&self, generation: u64, request: &CompiledRequest, phase: Phase) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = SearchState {
                generation,
                request: Some(request.clone()),
                phase,
            };
            true
        })
    }
}

impl fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("gateway", &self.gateway.name())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("hydration", &self.hydration)
            .finish()
    }
}

fn non_zero(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

// ============================================================================
// Tests
// ============================================================================
