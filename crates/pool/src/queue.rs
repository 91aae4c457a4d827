//! Bounded pending-job queue.
//!
//! Admission is non-blocking: [`JobQueue::offer`] either enqueues or
//! reports the queue full, and the caller turns a refusal into a
//! check-level failure. Workers park on [`WorkerQueue::take`] until a job
//! arrives or the pool shuts down (the sending half is dropped).

use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;

use std::sync::Arc;
use std::time::Instant;

use matcher::RuleMatch;

use crate::error::PoolError;
use crate::planner::Job;

/// Outcome of one job, delivered to the originating check's aggregator.
pub(crate) type JobOutcome = Result<Vec<RuleMatch>, PoolError>;

/// A job ready for execution, bundled with its deadline and the channel
/// the result must be delivered on.
pub(crate) struct Dispatch {
    pub job: Job,
    /// Absolute deadline, armed at enqueue so queue time counts against
    /// the job.
    pub deadline: Instant,
    /// The configured timeout, for error reporting.
    pub timeout: std::time::Duration,
    pub results: mpsc::UnboundedSender<JobOutcome>,
}

/// Sending half: owned by the pool.
pub(crate) struct JobQueue {
    tx: mpsc::Sender<Dispatch>,
    capacity: usize,
}

/// Receiving half: shared by the workers.
///
/// Dropping the pool drops the only [`JobQueue`], which closes the channel
/// and lets every worker drain out.
pub(crate) struct WorkerQueue {
    rx: AsyncMutex<mpsc::Receiver<Dispatch>>,
}

pub(crate) fn bounded(capacity: usize) -> (JobQueue, Arc<WorkerQueue>) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        JobQueue { tx, capacity },
        Arc::new(WorkerQueue {
            rx: AsyncMutex::new(rx),
        }),
    )
}

impl JobQueue {
    /// Non-blocking enqueue. Returns `false` when the queue is at
    /// capacity.
    pub fn offer(&self, dispatch: Dispatch) -> bool {
        self.tx.try_send(dispatch).is_ok()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl WorkerQueue {
    /// Wait for the next job in FIFO order; `None` once the pool has shut
    /// down and the queue is drained.
    pub async fn take(&self) -> Option<Dispatch> {
        self.rx.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegisteredMatcher;
    use matcher::mock::MockMatcher;

    use std::time::Duration;

    fn dispatch(tag: usize, results: &mpsc::UnboundedSender<JobOutcome>) -> Dispatch {
        Dispatch {
            job: Job {
                check_id: format!("check-{tag}"),
                matcher: RegisteredMatcher {
                    id: format!("m-{tag}"),
                    matcher: std::sync::Arc::new(MockMatcher::new(tag)),
                },
                category_ids: Default::default(),
                blocks: Vec::new(),
            },
            deadline: Instant::now() + Duration::from_secs(1),
            timeout: Duration::from_secs(1),
            results: results.clone(),
        }
    }

    #[tokio::test]
    async fn offer_rejects_when_full() {
        let (queue, _workers) = bounded(2);
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(queue.offer(dispatch(0, &tx)));
        assert!(queue.offer(dispatch(1, &tx)));
        assert!(!queue.offer(dispatch(2, &tx)));
        assert_eq!(queue.capacity(), 2);
    }

    #[tokio::test]
    async fn take_preserves_fifo_order() {
        let (queue, workers) = bounded(4);
        let (tx, _rx) = mpsc::unbounded_channel();

        for tag in 0..3 {
            assert!(queue.offer(dispatch(tag, &tx)));
        }

        for tag in 0..3 {
            let next = workers.take().await.expect("queue should hold a job");
            assert_eq!(next.job.check_id, format!("check-{tag}"));
        }
    }

    #[tokio::test]
    async fn take_returns_none_after_shutdown() {
        let (queue, workers) = bounded(1);
        drop(queue);
        assert!(workers.take().await.is_none());
    }
}
