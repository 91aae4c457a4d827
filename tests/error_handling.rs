//! Failure surfacing: matcher errors, unknown categories, timeouts, and
//! malformed checks.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use checkpool::{Check, MatcherPool, PoolConfig, PoolError, TextBlock};
use matcher::mock::{mock_category, mock_match, FailingMatcher, HangingMatcher, MockMatcher};

fn single_block_check(text: &str) -> Check {
    Check {
        set_id: "set-id".into(),
        blocks: vec![TextBlock::new("block-1", text, 0)],
        ..Default::default()
    }
}

#[tokio::test]
async fn matcher_error_message_surfaces_verbatim() {
    let pool = MatcherPool::with_defaults().expect("pool");
    let category = mock_category(0);
    pool.add_matcher(Arc::new(
        MockMatcher::new(0).with_responses(vec![mock_match(&category, 0, 5, "test-response")]),
    ));
    pool.add_matcher(Arc::new(FailingMatcher::new(1, "Something went wrong")));

    let err = pool
        .check(single_block_check("Example text"))
        .await
        .expect_err("check must fail");

    assert_eq!(err.to_string(), "Something went wrong");
    assert!(matches!(err, PoolError::Matcher(_)));
}

#[tokio::test]
async fn unknown_category_fails_and_names_the_id() {
    let pool = MatcherPool::with_defaults().expect("pool");
    pool.add_matcher(Arc::new(MockMatcher::new(0)));
    pool.add_matcher(Arc::new(MockMatcher::new(1)));

    let check = Check {
        set_id: "set-id".into(),
        category_ids: Some(HashSet::from(["category-id-does-not-exist".to_string()])),
        blocks: vec![TextBlock::new("block-1", "Example text", 0)],
        ..Default::default()
    };
    let err = pool.check(check).await.expect_err("check must fail");

    assert!(err.to_string().contains("category-id-does-not-exist"));
    assert!(matches!(err, PoolError::UnknownCategory(_)));
}

#[tokio::test]
async fn hanging_matcher_times_out_promptly() {
    let pool = MatcherPool::new(PoolConfig {
        check_timeout_ms: 500,
        ..PoolConfig::default()
    })
    .expect("pool");
    pool.add_matcher(Arc::new(HangingMatcher::new(0)));

    let started = Instant::now();
    let err = pool
        .check(single_block_check("Example text"))
        .await
        .expect_err("check must time out");
    let elapsed = started.elapsed();

    let message = err.to_string();
    assert!(message.contains("Timeout"), "got: {message}");
    assert!(message.contains("500 milliseconds"), "got: {message}");
    assert!(
        elapsed < Duration::from_secs(1),
        "timeout took {elapsed:?}"
    );
}

#[tokio::test]
async fn failed_check_does_not_poison_the_pool() {
    let pool = MatcherPool::with_defaults().expect("pool");
    let category = mock_category(0);
    pool.add_matcher(Arc::new(
        MockMatcher::new(0).with_responses(vec![mock_match(&category, 0, 5, "test-response")]),
    ));
    let failing = pool.add_matcher(Arc::new(FailingMatcher::new(1, "Something went wrong")));

    pool.check(single_block_check("Example text"))
        .await
        .expect_err("first check fails");

    // Same pool, responsive matchers only: the next check succeeds.
    pool.remove_matcher_by_id(&failing);
    let outcome = pool
        .check(single_block_check("Example text"))
        .await
        .expect("second check succeeds");
    assert_eq!(outcome.matches.len(), 1);
}

#[tokio::test]
async fn degenerate_pool_config_rejected() {
    let err = MatcherPool::new(PoolConfig {
        max_current_jobs: 0,
        ..PoolConfig::default()
    })
    .err()
    .expect("construction must fail");
    assert!(matches!(err, PoolError::InvalidConfig(_)));
}

#[tokio::test]
async fn duplicate_block_ids_rejected_at_admission() {
    let pool = MatcherPool::with_defaults().expect("pool");
    pool.add_matcher(Arc::new(MockMatcher::new(0)));

    let check = Check {
        set_id: "set-id".into(),
        blocks: vec![
            TextBlock::new("block-1", "one", 0),
            TextBlock::new("block-1", "two", 3),
        ],
        ..Default::default()
    };
    let err = pool.check(check).await.expect_err("check must fail");
    assert!(matches!(err, PoolError::InvalidCheck(_)));
    assert!(err.to_string().contains("block-1"));
}

#[tokio::test]
async fn block_span_mismatch_rejected_at_admission() {
    let pool = MatcherPool::with_defaults().expect("pool");
    pool.add_matcher(Arc::new(MockMatcher::new(0)));

    let mut block = TextBlock::new("block-1", "Example text", 0);
    block.to = 5;
    let check = Check {
        set_id: "set-id".into(),
        blocks: vec![block],
        ..Default::default()
    };
    let err = pool.check(check).await.expect_err("check must fail");
    assert!(matches!(err, PoolError::InvalidCheck(_)));
}
