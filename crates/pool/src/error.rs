use thiserror::Error;

use std::time::Duration;

pub type PoolResult<T> = Result<T, PoolError>;

/// Errors surfaced by [`MatcherPool::check`](crate::MatcherPool::check) and
/// pool construction.
///
/// The pool never recovers on a caller's behalf: the first failing job
/// short-circuits that check's future, and the remaining jobs run to
/// completion with their outcomes discarded. Other checks are unaffected.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool was constructed with degenerate settings.
    #[error("invalid pool config: {0}")]
    InvalidConfig(String),

    /// The check violates the data-model invariants.
    #[error("invalid check: {0}")]
    InvalidCheck(String),

    /// A requested category id is not covered by any registered matcher.
    #[error("unknown category id(s): {}", .0.join(", "))]
    UnknownCategory(Vec<String>),

    /// Admission failed because the pending-job queue is full.
    #[error("job queue is full (capacity {capacity}), try again later")]
    QueueFull { capacity: usize },

    /// A job outlived its deadline. The matcher is left running; its
    /// eventual result is discarded.
    #[error(
        "Timeout: matcher {matcher_id} did not respond within {} milliseconds",
        .duration.as_millis()
    )]
    Timeout {
        matcher_id: String,
        duration: Duration,
    },

    /// A matcher failed or panicked; the message is passed through
    /// verbatim.
    #[error("{0}")]
    Matcher(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_names_every_id() {
        let err = PoolError::UnknownCategory(vec!["cat-a".into(), "cat-b".into()]);
        let message = err.to_string();
        assert!(message.contains("cat-a"));
        assert!(message.contains("cat-b"));
    }

    #[test]
    fn queue_full_message_mentions_full() {
        let err = PoolError::QueueFull { capacity: 8 };
        assert!(err.to_string().contains("full"));
    }

    #[test]
    fn timeout_message_spells_out_milliseconds() {
        let err = PoolError::Timeout {
            matcher_id: "matcher-3".into(),
            duration: Duration::from_millis(500),
        };
        let message = err.to_string();
        assert!(message.contains("Timeout"));
        assert!(message.contains("500 milliseconds"));
    }

    #[test]
    fn matcher_failure_is_verbatim() {
        let err = PoolError::Matcher("Something went wrong".into());
        assert_eq!(err.to_string(), "Something went wrong");
    }
}
