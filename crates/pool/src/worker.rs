//! The worker set.
//!
//! A fixed number of tasks drain the job queue, so the number of matcher
//! invocations in flight can never exceed the worker count. Each job is
//! raced against its deadline; a matcher that overruns is left to finish in
//! the background with its result discarded.

use futures::FutureExt;
use tokio::task::JoinHandle;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use matcher::skip::reproject_match;
use matcher::RuleMatch;

use crate::error::PoolError;
use crate::planner::Job;
use crate::queue::{Dispatch, JobOutcome, WorkerQueue};

pub(crate) struct WorkerSet {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerSet {
    /// Spawn `count` workers draining `queue`. Workers exit on their own
    /// once the queue's sending half is dropped.
    pub fn spawn(count: usize, queue: Arc<WorkerQueue>) -> Self {
        let handles = (0..count)
            .map(|worker_id| {
                let queue = Arc::clone(&queue);
                tokio::spawn(worker_loop(worker_id, queue))
            })
            .collect();
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }
}

async fn worker_loop(worker_id: usize, queue: Arc<WorkerQueue>) {
    while let Some(dispatch) = queue.take().await {
        let outcome = execute(&dispatch).await;
        // The aggregator may already have completed (first failure wins) or
        // been dropped; a failed send is the discard path, not an error.
        let _ = dispatch.results.send(outcome);
    }
    tracing::debug!(worker_id, "worker exiting, queue closed");
}

/// Run one job: arm the deadline, invoke the matcher, re-project offsets.
async fn execute(dispatch: &Dispatch) -> JobOutcome {
    let job = &dispatch.job;
    tracing::trace!(
        check_id = %job.check_id,
        matcher_id = %job.matcher.id,
        blocks = job.blocks.len(),
        "job.start"
    );

    let remaining = dispatch.deadline.saturating_duration_since(Instant::now());
    let request = job.request();
    let guarded = AssertUnwindSafe(job.matcher.matcher.check(request)).catch_unwind();

    match tokio::time::timeout(remaining, guarded).await {
        Err(_elapsed) => {
            tracing::warn!(
                check_id = %job.check_id,
                matcher_id = %job.matcher.id,
                timeout_ms = dispatch.timeout.as_millis() as u64,
                "job.timeout"
            );
            Err(PoolError::Timeout {
                matcher_id: job.matcher.id.clone(),
                duration: dispatch.timeout,
            })
        }
        Ok(Err(panic)) => {
            let message = panic_message(panic);
            tracing::error!(
                check_id = %job.check_id,
                matcher_id = %job.matcher.id,
                %message,
                "job.panicked"
            );
            Err(PoolError::Matcher(message))
        }
        Ok(Ok(Err(err))) => Err(PoolError::Matcher(err.to_string())),
        Ok(Ok(Ok(matches))) => Ok(reproject_all(job, matches)),
    }
}

/// Map every match back into original document coordinates using the
/// skipped ranges of the block the match falls in.
fn reproject_all(job: &Job, matches: Vec<RuleMatch>) -> Vec<RuleMatch> {
    matches
        .into_iter()
        .map(|rule_match| {
            let owner = job.blocks.iter().find(|planned| {
                planned.elided.from <= rule_match.from_pos
                    && rule_match.from_pos <= planned.elided.to
            });
            match owner {
                Some(planned) if !planned.skipped.is_empty() => {
                    reproject_match(rule_match, &planned.skipped)
                }
                _ => rule_match,
            }
        })
        .collect()
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "matcher panicked".to_string()
    }
}
