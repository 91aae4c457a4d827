//! Workspace umbrella crate for checkpool.
//!
//! Checkpool is a concurrent text-checking engine: callers submit blocks
//! of document text, the pool fans them out to registered *matchers*
//! (independent rule engines grouped by category), enforces a bounded
//! queue and per-job timeouts, and aggregates the reported rule matches —
//! with offsets mapped back across any redacted ("skipped") text regions.
//!
//! The `checkpool` crate re-exports the matcher, pool, and validator
//! layers so applications can drive a whole deployment through a single
//! dependency. The HTTP adapter lives in the separate `server` crate.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use checkpool::{Check, MatcherPool, PoolConfig, TextBlock};
//!
//! # async fn demo(engine: Arc<dyn checkpool::Matcher>) -> Result<(), checkpool::PoolError> {
//! let pool = MatcherPool::new(PoolConfig::default())?;
//! pool.add_matcher(engine);
//!
//! let outcome = pool
//!     .check(Check {
//!         set_id: "style-guide".into(),
//!         blocks: vec![TextBlock::new("p1", "Example text", 0)],
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! for rule_match in &outcome.matches {
//!     println!(
//!         "{}..{} {}",
//!         rule_match.from_pos, rule_match.to_pos, rule_match.message
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration files
//!
//! Deployments that prefer file-based configuration can load a YAML
//! description of the pool via [`CheckpoolConfig`]; see [`config`] for the
//! format.
//!
//! ## Observability
//!
//! Install a [`PoolMetrics`] recorder via [`set_pool_metrics`] during
//! startup to capture per-check latency and match counts; the pool and
//! server also emit structured `tracing` events throughout.

pub mod config;

pub use matcher::{
    Category, Check, MatchError, Matcher, MatcherRequest, Rule, RuleMatch, TextBlock, TextRange,
};
pub use pool::{
    set_pool_metrics, CheckOutcome, CheckStrategy, MatcherPool, PoolConfig, PoolError,
    PoolMetrics, PoolResult,
};
pub use validator::{Validator, ValidatorMatcher, ValidatorRequest};

pub use crate::config::{CheckpoolConfig, ConfigLoadError};
