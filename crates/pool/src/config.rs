use serde::{Deserialize, Serialize};

use std::time::Duration;

use crate::error::PoolError;

/// How a check is expanded into jobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckStrategy {
    /// One job per selected matcher, carrying every block of the check.
    #[default]
    DocumentPerCategory,
    /// One job per (matcher, block) pair. Maximises parallelism and gives
    /// the queue fine-grained backpressure against oversized documents.
    BlockLevel,
}

/// Tuning knobs for a [`MatcherPool`](crate::MatcherPool).
///
/// Serde-friendly so it can be embedded in service configs; all fields have
/// defaults and [`validate`](PoolConfig::validate) rejects the degenerate
/// values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of workers, and therefore the hard bound on concurrently
    /// executing jobs.
    #[serde(default = "PoolConfig::default_max_current_jobs")]
    pub max_current_jobs: usize,

    /// Capacity of the pending-job queue. Checks that would push past this
    /// fail at admission instead of piling up.
    #[serde(default = "PoolConfig::default_max_queued_jobs")]
    pub max_queued_jobs: usize,

    /// Planning strategy used for every check on this pool.
    #[serde(default)]
    pub strategy: CheckStrategy,

    /// Per-job timeout in milliseconds, measured from enqueue.
    #[serde(default = "PoolConfig::default_check_timeout_ms")]
    pub check_timeout_ms: u64,
}

impl PoolConfig {
    pub(crate) fn default_max_current_jobs() -> usize {
        4
    }

    pub(crate) fn default_max_queued_jobs() -> usize {
        100
    }

    pub(crate) fn default_check_timeout_ms() -> u64 {
        10_000
    }

    /// Per-job timeout as a [`Duration`].
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }

    /// Reject configurations the pool cannot run with.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_current_jobs == 0 {
            return Err(PoolError::InvalidConfig(
                "max_current_jobs must be greater than zero".into(),
            ));
        }
        if self.max_queued_jobs == 0 {
            return Err(PoolError::InvalidConfig(
                "max_queued_jobs must be greater than zero".into(),
            ));
        }
        if self.check_timeout_ms == 0 {
            return Err(PoolError::InvalidConfig(
                "check_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_current_jobs: Self::default_max_current_jobs(),
            max_queued_jobs: Self::default_max_queued_jobs(),
            strategy: CheckStrategy::default(),
            check_timeout_ms: Self::default_check_timeout_ms(),
        }
    }
}
