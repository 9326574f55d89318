//! Integration tests for the search → hydrate → assemble flow.

use chrono::Utc;
use skysift_core::{SearchCriteria, TransportError, TransportStatus, TriState};
use skysift_search::{EmptyReason, Phase, RunOutcome, Stage};

use crate::common::{TestHarness, uris_of};

#[tokio::test]
async fn test_results_follow_index_rank_order() {
    let harness = TestHarness::new();
    let criteria = SearchCriteria::new().with_text("rust").with_language("en");
    let request = skysift_query::compile_in(&criteria, &Utc);
    harness
        .gateway
        .respond(&request.query, &["at://p/3", "at://p/1", "at://p/2"]);

    let outcome = harness.pipeline.submit_in(&criteria, &Utc).await;
    let RunOutcome::Completed(result) = outcome else {
        panic!("expected results, got {outcome:?}");
    };

    assert_eq!(
        uris_of(&result.posts),
        vec!["at://p/3", "at://p/1", "at://p/2"]
    );
    assert_eq!(result.posts[0].text(), "text of at://p/3");
    assert_eq!(result.matched, 3);

    // one batch, sorted by the cache key
    let batches = harness.fetcher.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], ["at://p/1", "at://p/2", "at://p/3"]);
}

#[tokio::test]
async fn test_no_matches_skips_hydration() {
    let harness = TestHarness::new();
    let criteria = SearchCriteria::new().with_is_reply(TriState::Yes);

    let outcome = harness.pipeline.submit_in(&criteria, &Utc).await;
    let RunOutcome::Completed(result) = outcome else {
        panic!("expected empty results, got {outcome:?}");
    };

    assert_eq!(harness.fetcher.calls(), 0);
    assert_eq!(result.empty_reason(), Some(EmptyReason::NoMatches));
}

#[tokio::test]
async fn test_matches_that_do_not_hydrate_are_a_distinct_empty_state() {
    let harness = TestHarness::new();
    let request = skysift_query::compile_in(&SearchCriteria::new(), &Utc);
    harness.gateway.respond(&request.query, &["at://gone/1"]);
    harness.fetcher.mark_missing("at://gone/1");

    let outcome = harness.pipeline.run(request).await;
    let RunOutcome::Completed(result) = outcome else {
        panic!("expected empty results, got {outcome:?}");
    };

    assert_eq!(result.empty_reason(), Some(EmptyReason::NothingHydrated));
    assert_eq!(result.missing(), 1);
}

#[tokio::test]
async fn test_missing_posts_are_skipped_silently() {
    let harness = TestHarness::new();
    let request = skysift_query::compile_in(&SearchCriteria::new(), &Utc);
    harness
        .gateway
        .respond(&request.query, &["at://p/1", "at://gone/2", "at://p/3"]);
    harness.fetcher.mark_missing("at://gone/2");

    let outcome = harness.pipeline.run(request).await;
    let RunOutcome::Completed(result) = outcome else {
        panic!("expected results, got {outcome:?}");
    };
    assert_eq!(uris_of(&result.posts), vec!["at://p/1", "at://p/3"]);
}

#[tokio::test]
async fn test_search_failure_is_tagged_with_search_stage() {
    let harness = TestHarness::new();
    let request = skysift_query::compile_in(&SearchCriteria::new(), &Utc);
    harness
        .gateway
        .fail(&request.query, TransportError::fetch("connection refused"));

    let outcome = harness.pipeline.run(request).await;
    let RunOutcome::Failed(err) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(err.stage, Stage::Search);
    assert_eq!(err.source.status, TransportStatus::Fetch);

    let state = harness.pipeline.state();
    assert!(!state.is_loading());
    assert_eq!(state.error(), Some(&err));
    assert_eq!(harness.fetcher.calls(), 0);
}

#[tokio::test]
async fn test_hydration_failure_is_tagged_with_hydrate_stage() {
    let harness = TestHarness::new();
    let request = skysift_query::compile_in(&SearchCriteria::new(), &Utc);
    harness.gateway.respond(&request.query, &["at://p/1"]);
    harness
        .fetcher
        .fail_with(TransportError::http(502, "bad gateway"));

    let outcome = harness.pipeline.run(request).await;
    let RunOutcome::Failed(err) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(err.stage, Stage::Hydrate);
    assert_eq!(err.source.http_status(), Some(502));
    assert!(err.to_string().starts_with("Error fetching posts"));
}

#[tokio::test]
async fn test_identical_submit_refetches() {
    let harness = TestHarness::new();
    let criteria = SearchCriteria::new().with_hashtag("rust");
    let request = skysift_query::compile_in(&criteria, &Utc);
    harness.gateway.respond(&request.query, &["at://p/1"]);

    harness.pipeline.submit_in(&criteria, &Utc).await;
    harness.pipeline.submit_in(&criteria, &Utc).await;

    assert_eq!(harness.gateway.calls(), 2);
    assert_eq!(harness.fetcher.calls(), 2);
    assert_eq!(harness.pipeline.state().generation, 2);
}

#[tokio::test]
async fn test_refetch_without_request() {
    let harness = TestHarness::new();
    assert_eq!(harness.pipeline.refetch().await, RunOutcome::NoRequest);
    assert_eq!(harness.gateway.calls(), 0);
    assert_eq!(harness.pipeline.state().phase, Phase::Idle);
}

#[tokio::test]
async fn test_refetch_repeats_active_request() {
    let harness = TestHarness::new();
    let criteria = SearchCriteria::new().with_hashtag("rust");

    harness.pipeline.submit_in(&criteria, &Utc).await;
    let outcome = harness.pipeline.refetch().await;

    assert!(matches!(outcome, RunOutcome::Completed(_)));
    assert_eq!(harness.gateway.calls(), 2);
    assert_eq!(
        harness.pipeline.current_request().unwrap().query,
        "rkey:[* TO *] +tag:(rust)"
    );
}
