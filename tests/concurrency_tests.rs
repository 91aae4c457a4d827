//! Concurrency behaviour of the pool: the worker bound, queue
//! backpressure, and parallel checks from many tasks.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use checkpool::{
    Category, Check, CheckStrategy, MatchError, Matcher, MatcherPool, MatcherRequest, PoolConfig,
    RuleMatch, TextBlock,
};
use matcher::mock::{mock_category, mock_match, MockMatcher};

/// Tracks how many checks are running inside it at once.
struct GaugeMatcher {
    current: AtomicUsize,
    peak: AtomicUsize,
    delay: Duration,
}

impl GaugeMatcher {
    fn new(delay: Duration) -> Self {
        Self {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delay,
        }
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Matcher for GaugeMatcher {
    fn id(&self) -> Option<String> {
        Some("gauge-matcher".into())
    }

    fn kind(&self) -> &str {
        "gauge"
    }

    fn categories(&self) -> HashSet<Category> {
        HashSet::from([mock_category(0)])
    }

    async fn check(&self, _request: MatcherRequest) -> Result<Vec<RuleMatch>, MatchError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

fn many_block_check(count: usize) -> Check {
    let blocks = (0..count)
        .map(|i| TextBlock::new(format!("block-{i}"), "Example text", i * 12))
        .collect();
    Check {
        set_id: "set-id".into(),
        blocks,
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_invocations_never_exceed_worker_count() {
    let pool = MatcherPool::new(PoolConfig {
        max_current_jobs: 2,
        max_queued_jobs: 100,
        strategy: CheckStrategy::BlockLevel,
        check_timeout_ms: 10_000,
    })
    .expect("pool");
    let gauge = Arc::new(GaugeMatcher::new(Duration::from_millis(10)));
    pool.add_matcher(gauge.clone());

    pool.check(many_block_check(20))
        .await
        .expect("check should succeed");

    assert!(gauge.peak() >= 1);
    assert!(
        gauge.peak() <= 2,
        "observed {} concurrent invocations with 2 workers",
        gauge.peak()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_document_overflows_the_queue() {
    let pool = MatcherPool::new(PoolConfig {
        max_current_jobs: 1,
        max_queued_jobs: 1,
        strategy: CheckStrategy::BlockLevel,
        check_timeout_ms: 10_000,
    })
    .expect("pool");
    pool.add_matcher(Arc::new(
        MockMatcher::new(0).with_delay(Duration::from_millis(50)),
    ));

    let err = pool
        .check(many_block_check(101))
        .await
        .expect_err("admission must fail");

    assert!(err.to_string().contains("full"), "got: {err}");
}

#[tokio::test(flavor = "multi_thread")]
async fn queue_overflow_leaves_the_pool_usable() {
    let pool = Arc::new(
        MatcherPool::new(PoolConfig {
            max_current_jobs: 1,
            max_queued_jobs: 1,
            strategy: CheckStrategy::BlockLevel,
            check_timeout_ms: 10_000,
        })
        .expect("pool"),
    );
    let category = mock_category(0);
    pool.add_matcher(Arc::new(
        MockMatcher::new(0)
            .with_responses(vec![mock_match(&category, 0, 5, "test-response")])
            .with_delay(Duration::from_millis(20)),
    ));

    pool.check(many_block_check(101))
        .await
        .expect_err("saturating check fails");

    // The jobs that made it in drain on their own; a small follow-up check
    // goes through.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let outcome = pool
        .check(many_block_check(1))
        .await
        .expect("follow-up check succeeds");
    assert_eq!(outcome.matches.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn parallel_checks_from_many_tasks_all_succeed() {
    let pool = Arc::new(
        MatcherPool::new(PoolConfig {
            max_current_jobs: 4,
            ..PoolConfig::default()
        })
        .expect("pool"),
    );
    let category = mock_category(0);
    pool.add_matcher(Arc::new(
        MockMatcher::new(0)
            .with_responses(vec![mock_match(&category, 0, 5, "test-response")])
            .with_delay(Duration::from_millis(5)),
    ));

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move {
                let check = Check {
                    document_id: Some(format!("doc-{i}")),
                    set_id: "set-id".into(),
                    blocks: vec![TextBlock::new("block-1", "Example text", 0)],
                    ..Default::default()
                };
                pool.check(check).await
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle
            .await
            .expect("task join")
            .expect("check should succeed");
        assert_eq!(outcome.matches.len(), 1);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn registry_mutations_race_safely_with_checks() {
    let pool = Arc::new(MatcherPool::with_defaults().expect("pool"));
    let category = mock_category(0);
    pool.add_matcher(Arc::new(
        MockMatcher::new(0)
            .with_responses(vec![mock_match(&category, 0, 5, "test-response")])
            .with_delay(Duration::from_millis(2)),
    ));

    let checker = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            let mut completed = 0;
            for _ in 0..50 {
                let check = Check {
                    set_id: "set-id".into(),
                    blocks: vec![TextBlock::new("block-1", "Example text", 0)],
                    ..Default::default()
                };
                // Depending on interleaving the registry may be empty; both
                // outcomes are fine, failing is not.
                pool.check(check).await.expect("check should succeed");
                completed += 1;
            }
            completed
        })
    };

    let mutator = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            for i in 0..50 {
                pool.add_matcher(Arc::new(MockMatcher::new(i % 3 + 1)));
                tokio::time::sleep(Duration::from_millis(1)).await;
                pool.remove_matcher_by_id(&format!("mock-matcher-{}", i % 3 + 1));
            }
        })
    };

    assert_eq!(checker.await.expect("checker join"), 50);
    mutator.await.expect("mutator join");
}
