use tokio::sync::mpsc;
use uuid::Uuid;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use matcher::{Category, Check, Matcher, RuleMatch};

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::metrics::metrics_recorder;
use crate::planner::plan;
use crate::queue::{bounded, Dispatch, JobQueue};
use crate::registry::{MatcherRegistry, RegisteredMatcher};
use crate::worker::WorkerSet;

/// Result of a successful check: the category ids that were dispatched to,
/// and every match the jobs produced.
///
/// Match order is preserved within a single job; between jobs it depends on
/// completion order and must not be relied on.
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
    pub category_ids: HashSet<String>,
    pub matches: Vec<RuleMatch>,
}

/// Concurrent dispatch engine routing text blocks to registered matchers.
///
/// The pool owns a bounded job queue and a fixed worker set; a check is
/// planned into jobs, admitted to the queue, executed with a per-job
/// deadline, and aggregated back into one future. Construction spawns the
/// workers, so a pool must be created inside a Tokio runtime.
pub struct MatcherPool {
    config: PoolConfig,
    registry: MatcherRegistry,
    queue: JobQueue,
    workers: WorkerSet,
}

impl MatcherPool {
    /// Build a pool and spawn its workers.
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        let (queue, worker_queue) = bounded(config.max_queued_jobs);
        let workers = WorkerSet::spawn(config.max_current_jobs, worker_queue);
        tracing::info!(
            workers = workers.len(),
            queue_capacity = queue.capacity(),
            strategy = ?config.strategy,
            timeout_ms = config.check_timeout_ms,
            "matcher pool started"
        );
        Ok(Self {
            config,
            registry: MatcherRegistry::new(),
            queue,
            workers,
        })
    }

    /// Pool with default settings; convenient for tests and demos.
    pub fn with_defaults() -> PoolResult<Self> {
        Self::new(PoolConfig::default())
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of workers, and therefore the concurrency bound.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Register a matcher and return the id it is reachable under.
    ///
    /// Matchers that declare no id get a monotonically unique one.
    /// Re-adding the same matcher is a no-op.
    pub fn add_matcher(&self, new: Arc<dyn Matcher>) -> String {
        let id = self.registry.add(new);
        tracing::debug!(matcher_id = %id, "matcher registered");
        id
    }

    /// Remove a matcher from the registry.
    ///
    /// Jobs already in flight keep their matcher handle and still deliver
    /// their results; only checks that start afterwards see the removal.
    pub fn remove_matcher_by_id(&self, id: &str) -> bool {
        let removed = self.registry.remove_by_id(id);
        if removed {
            tracing::debug!(matcher_id = %id, "matcher removed");
        }
        removed
    }

    /// Clear the registry. Same in-flight semantics as
    /// [`remove_matcher_by_id`](Self::remove_matcher_by_id).
    pub fn remove_all_matchers(&self) {
        self.registry.clear();
        tracing::debug!("all matchers removed");
    }

    /// Union of the categories of every currently registered matcher.
    pub fn current_categories(&self) -> HashSet<Category> {
        self.registry.categories()
    }

    /// Run one check to completion.
    ///
    /// Fails fast on unknown categories and on queue overflow; otherwise
    /// resolves once every job has completed, or as soon as the first job
    /// fails or times out. Jobs past the first failure still run, but their
    /// outcomes are discarded.
    pub async fn check(&self, check: Check) -> PoolResult<CheckOutcome> {
        let started = Instant::now();
        let result = self.run_check(&check).await;
        let latency = started.elapsed();

        if let Some(recorder) = metrics_recorder() {
            let (jobs, matches, success) = match &result {
                Ok((jobs, outcome)) => (*jobs, outcome.matches.len(), true),
                Err(_) => (0, 0, false),
            };
            recorder.record_check(&check.set_id, latency, jobs, matches, success);
        }

        result.map(|(_, outcome)| outcome)
    }

    async fn run_check(&self, check: &Check) -> PoolResult<(usize, CheckOutcome)> {
        check
            .validate()
            .map_err(|err| PoolError::InvalidCheck(err.to_string()))?;

        // One snapshot per check; registry mutations no longer affect us.
        let snapshot = self.registry.snapshot();
        let known_ids: HashSet<String> = snapshot
            .iter()
            .flat_map(|entry| entry.matcher.categories())
            .map(|category| category.id)
            .collect();

        let resolved: HashSet<String> = match check.requested_category_ids() {
            Some(requested) => {
                let mut unknown: Vec<String> = requested
                    .iter()
                    .filter(|id| !known_ids.contains(*id))
                    .cloned()
                    .collect();
                if !unknown.is_empty() {
                    unknown.sort();
                    return Err(PoolError::UnknownCategory(unknown));
                }
                requested.clone()
            }
            None => known_ids,
        };

        let selected: Vec<RegisteredMatcher> = snapshot
            .into_iter()
            .filter(|entry| {
                entry
                    .matcher
                    .categories()
                    .iter()
                    .any(|category| resolved.contains(&category.id))
            })
            .collect();

        let check_id = check
            .document_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let jobs = plan(self.config.strategy, &check_id, check, &selected, &resolved);
        let job_count = jobs.len();
        let dispatched_categories: HashSet<String> = jobs
            .iter()
            .flat_map(|job| job.category_ids.iter().cloned())
            .collect();

        tracing::debug!(
            check_id = %check_id,
            set_id = %check.set_id,
            jobs = job_count,
            categories = dispatched_categories.len(),
            "check.planned"
        );

        let (results_tx, mut results_rx) = mpsc::unbounded_channel();
        let timeout = self.config.check_timeout();
        let deadline = Instant::now() + timeout;
        for dispatch_job in jobs {
            let dispatch = Dispatch {
                job: dispatch_job,
                deadline,
                timeout,
                results: results_tx.clone(),
            };
            if !self.queue.offer(dispatch) {
                // Jobs already admitted for this check keep running; their
                // results land in a channel nobody reads.
                tracing::warn!(
                    check_id = %check_id,
                    capacity = self.queue.capacity(),
                    "check.queue_full"
                );
                return Err(PoolError::QueueFull {
                    capacity: self.queue.capacity(),
                });
            }
        }
        drop(results_tx);

        let mut matches = Vec::new();
        for _ in 0..job_count {
            match results_rx.recv().await {
                Some(Ok(job_matches)) => matches.extend(job_matches),
                Some(Err(err)) => return Err(err),
                None => {
                    return Err(PoolError::Matcher(
                        "matcher terminated without delivering a result".into(),
                    ))
                }
            }
        }

        tracing::debug!(
            check_id = %check_id,
            matches = matches.len(),
            "check.completed"
        );

        Ok((
            job_count,
            CheckOutcome {
                category_ids: dispatched_categories,
                matches,
            },
        ))
    }
}
