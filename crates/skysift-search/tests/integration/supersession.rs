//! Integration tests for last-request-wins.

use std::sync::Arc;

use chrono::Utc;
use skysift_core::SearchCriteria;
use skysift_search::{Phase, RunOutcome};

use crate::common::{TestHarness, uris_of};

fn tagged(tag: &str) -> SearchCriteria {
    SearchCriteria::new().with_hashtag(tag)
}

#[tokio::test]
async fn test_later_search_wins_when_earlier_resolves_last() {
    let harness = TestHarness::new();
    let request_a = skysift_query::compile_in(&tagged("a"), &Utc);
    let request_b = skysift_query::compile_in(&tagged("b"), &Utc);
    harness.gateway.respond(&request_a.query, &["at://a/1"]);
    harness
        .gateway
        .respond(&request_b.query, &["at://b/1", "at://b/2"]);
    let gate_a = harness.gateway.gate(&request_a.query);

    let pipeline = Arc::clone(&harness.pipeline);
    let mut rx = harness.pipeline.subscribe();
    let run_a = tokio::spawn(async move { pipeline.run(request_a).await });

    // wait until A is searching
    rx.wait_for(|s| s.generation == 1).await.unwrap();

    let outcome_b = harness.pipeline.run(request_b.clone()).await;
    let RunOutcome::Completed(result_b) = outcome_b else {
        panic!("B should complete, got {outcome_b:?}");
    };
    assert_eq!(uris_of(&result_b.posts), vec!["at://b/1", "at://b/2"]);

    gate_a.notify_one();
    let outcome_a = run_a.await.unwrap();
    assert!(outcome_a.is_superseded());

    let state = harness.pipeline.state();
    assert_eq!(state.generation, 2);
    assert_eq!(state.request.as_ref(), Some(&request_b));
    assert_eq!(state.data().unwrap().posts.len(), 2);
    // A never reached hydration
    assert_eq!(harness.fetcher.calls(), 1);
}

#[tokio::test]
async fn test_superseded_failure_is_not_published() {
    let harness = TestHarness::new();
    let request_a = skysift_query::compile_in(&tagged("a"), &Utc);
    let request_b = skysift_query::compile_in(&tagged("b"), &Utc);
    harness.gateway.fail(
        &request_a.query,
        skysift_core::TransportError::http(500, "late failure"),
    );
    harness.gateway.respond(&request_b.query, &[]);
    let gate_a = harness.gateway.gate(&request_a.query);

    let pipeline = Arc::clone(&harness.pipeline);
    let mut rx = harness.pipeline.subscribe();
    let run_a = tokio::spawn(async move { pipeline.run(request_a).await });
    rx.wait_for(|s| s.generation == 1).await.unwrap();

    harness.pipeline.run(request_b).await;
    gate_a.notify_one();
    assert_eq!(run_a.await.unwrap(), RunOutcome::Superseded);

    let state = harness.pipeline.state();
    assert!(state.error().is_none());
    assert!(matches!(state.phase, Phase::Complete(_)));
}
