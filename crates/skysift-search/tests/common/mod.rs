//! Common test doubles for the search pipeline.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use skysift_client::{PostFetcher, SearchGateway};
use skysift_core::{Author, PostRecord, PostReference, TransportError};
use skysift_query::CompiledRequest;
use skysift_search::{HydrationCache, SearchPipeline};
use tokio::sync::Notify;

/// Build references from URIs.
pub fn refs(uris: &[&str]) -> Vec<PostReference> {
    uris.iter().map(|u| PostReference::new(*u)).collect()
}

/// URIs of assembled posts, in order.
pub fn uris_of(posts: &[PostRecord]) -> Vec<String> {
    posts.iter().map(|p| p.uri.clone()).collect()
}

// ============================================================================
// ScriptedGateway
// ============================================================================

/// Gateway answering from a query → result table.
///
/// Unknown queries resolve to no matches. A query can be gated so its
/// response is held until the test releases it.
#[derive(Default)]
pub struct ScriptedGateway {
    responses: Mutex<HashMap<String, Result<Vec<PostReference>, TransportError>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `query` with `uris`.
    pub fn respond(&self, query: &str, uris: &[&str]) {
        self.responses
            .lock()
            .insert(query.to_string(), Ok(refs(uris)));
    }

    /// Answer `query` with a failure.
    pub fn fail(&self, query: &str, err: TransportError) {
        self.responses.lock().insert(query.to_string(), Err(err));
    }

    /// Hold `query` until the returned handle is notified.
    pub fn gate(&self, query: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .insert(query.to_string(), Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchGateway for ScriptedGateway {
    async fn search(
        &self,
        request: &CompiledRequest,
    ) -> Result<Vec<PostReference>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().get(&request.query).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let response = self.responses.lock().get(&request.query).cloned();
        response.unwrap_or_else(|| Ok(Vec::new()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// CountingFetcher
// ============================================================================

/// Fetcher that hydrates every URI except the ones marked missing.
#[derive(Default)]
pub struct CountingFetcher {
    missing: Mutex<HashSet<String>>,
    failure: Mutex<Option<TransportError>>,
    batches: Mutex<Vec<Vec<String>>>,
}

impl CountingFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Pretend `uri` was deleted.
    pub fn mark_missing(&self, uri: &str) {
        self.missing.lock().insert(uri.to_string());
    }

    /// Fail every call with `err`.
    pub fn fail_with(&self, err: TransportError) {
        *self.failure.lock() = Some(err);
    }

    pub fn calls(&self) -> usize {
        self.batches.lock().len()
    }

    /// URI batches in call order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl PostFetcher for CountingFetcher {
    async fn get_posts(&self, uris: &[String]) -> Result<Vec<PostRecord>, TransportError> {
        self.batches.lock().push(uris.to_vec());
        tokio::task::yield_now().await;

        let failure = self.failure.lock().clone();
        if let Some(err) = failure {
            return Err(err);
        }

        let missing = self.missing.lock().clone();
        Ok(uris
            .iter()
            .filter(|u| !missing.contains(*u))
            .map(|u| {
                let mut post = PostRecord::new(u.clone(), Author::default());
                post.record.text = format!("text of {u}");
                post
            })
            .collect())
    }
}

// ============================================================================
// TestHarness
// ============================================================================

/// Pipeline wired to a scripted gateway and a counting fetcher.
pub struct TestHarness {
    pub gateway: Arc<ScriptedGateway>,
    pub fetcher: Arc<CountingFetcher>,
    pub pipeline: Arc<SearchPipeline>,
}

impl TestHarness {
    pub fn new() -> Self {
        let gateway = ScriptedGateway::new();
        let fetcher = CountingFetcher::new();
        let cache = Arc::new(HydrationCache::new(fetcher.clone()));
        let pipeline = Arc::new(SearchPipeline::new(gateway.clone(), cache));
        Self {
            gateway,
            fetcher,
            pipeline,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
