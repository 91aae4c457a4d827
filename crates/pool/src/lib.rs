//! # Checkpool Pool (`pool`)
//!
//! ## Purpose
//!
//! `pool` is the scheduling core of checkpool. It accepts a
//! [`Check`](matcher::Check) (blocks of document text plus an optional
//! category filter), expands it
//! into jobs across the registered matchers, pushes those jobs through a
//! bounded queue into a fixed worker set, applies a per-job deadline, and
//! aggregates the matches back into a single future.
//!
//! ## Shape of a check
//!
//! ```text
//! Check → plan → [Job] → JobQueue → workers → Matcher::check → [RuleMatch]
//!                                      ↑ deadline race   ↑ offset re-projection
//!                                               ↓
//!                             (dispatched category ids, matches)
//! ```
//!
//! ## Guarantees
//!
//! - At most `max_current_jobs` matcher invocations run at once; at most
//!   `max_queued_jobs` wait. Admission past that fails the check with a
//!   queue-full error rather than buffering without bound.
//! - The first failing or timed-out job fails the whole check; remaining
//!   jobs run to completion in the background and their results are
//!   discarded. Matchers are never interrupted.
//! - Registry mutations never disturb checks already in flight: each check
//!   snapshots the registry once at admission.
//! - Reported category ids are exactly the categories of the jobs that
//!   were dispatched, whether or not they produced matches.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use matcher::{Check, TextBlock};
//! use pool::{MatcherPool, PoolConfig};
//!
//! # async fn demo(engine: Arc<dyn matcher::Matcher>) -> Result<(), pool::PoolError> {
//! let pool = MatcherPool::new(PoolConfig::default())?;
//! pool.add_matcher(engine);
//!
//! let check = Check {
//!     set_id: "style-guide".into(),
//!     blocks: vec![TextBlock::new("p1", "Example text", 0)],
//!     ..Default::default()
//! };
//! let outcome = pool.check(check).await?;
//! println!("{} matches", outcome.matches.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Observability
//!
//! Install a [`PoolMetrics`] implementation via [`set_pool_metrics`] to
//! record per-check latency and match counts; structured `tracing` events
//! are emitted along the admission and execution path.

pub mod config;
pub mod error;
pub mod metrics;
pub mod planner;
pub mod registry;

mod pool;
mod queue;
mod worker;

pub use crate::config::{CheckStrategy, PoolConfig};
pub use crate::error::{PoolError, PoolResult};
pub use crate::metrics::{set_pool_metrics, PoolMetrics};
pub use crate::pool::{CheckOutcome, MatcherPool};
pub use crate::registry::RegisteredMatcher;
