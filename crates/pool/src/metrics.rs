//! Metrics hooks for the pool.
//!
//! Callers install a global [`PoolMetrics`] implementation via
//! [`set_pool_metrics`]; every [`MatcherPool::check`](crate::MatcherPool::check)
//! then reports its latency, job count, and match count. This keeps
//! instrumentation decoupled from any specific metrics backend.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Metrics observer for check operations.
pub trait PoolMetrics: Send + Sync {
    /// Record the outcome of one check.
    ///
    /// `set_id` identifies the rule set the check ran against, `latency`
    /// is the wall-clock time from admission to aggregation, `jobs` is the
    /// number of jobs planned, `matches` the number of matches returned
    /// (zero on failure), and `success` whether the check's future
    /// resolved successfully.
    fn record_check(
        &self,
        set_id: &str,
        latency: Duration,
        jobs: usize,
        matches: usize,
        success: bool,
    );
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PoolMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn PoolMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn PoolMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global pool metrics recorder.
///
/// Typically called once during service startup so every pool instance
/// shares the same backend.
pub fn set_pool_metrics(recorder: Option<Arc<dyn PoolMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().expect("pool metrics lock poisoned");
    *guard = recorder;
}
