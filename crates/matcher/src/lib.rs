//! # Checkpool Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` defines the data model and the capability contract that the
//! checkpool engine (`pool`) schedules work against. A *matcher* is any
//! rule engine that can examine text blocks and report rule violations:
//! a regex bank, a grammar service, a name-lookup validator. The pool sees
//! all of them through the single [`Matcher`] trait.
//!
//! ## Core Types
//!
//! - [`Category`]: a named grouping of rules, used to filter checks and to
//!   report what a check covered.
//! - [`TextBlock`] / [`TextRange`]: one contiguous slice of the source
//!   document, with optional skip ranges marking characters that must be
//!   elided before matching.
//! - [`Check`]: one caller-facing request — a rule-set id, an optional
//!   category filter, and the blocks to examine.
//! - [`MatcherRequest`]: what actually reaches a matcher after category
//!   filtering and skipped-range elision.
//! - [`RuleMatch`]: one reported violation, positioned in document
//!   coordinates.
//! - [`Matcher`]: the capability trait itself.
//!
//! ## Skipped ranges
//!
//! The [`skip`] module holds the pure transform pair: [`skip::elide_block`]
//! strips skipped characters from a block before dispatch, and
//! [`skip::reproject_position`] maps positions reported against the elided
//! text back onto the original document. See the module docs for the
//! coordinate rules.
//!
//! ## Example
//!
//! ```no_run
//! use std::collections::HashSet;
//! use async_trait::async_trait;
//! use matcher::{Category, MatchError, Matcher, MatcherRequest, RuleMatch};
//!
//! struct NoopMatcher;
//!
//! #[async_trait]
//! impl Matcher for NoopMatcher {
//!     fn kind(&self) -> &str {
//!         "noop"
//!     }
//!
//!     fn categories(&self) -> HashSet<Category> {
//!         HashSet::from([Category::new("style", "Style")])
//!     }
//!
//!     async fn check(&self, _request: MatcherRequest) -> Result<Vec<RuleMatch>, MatchError> {
//!         Ok(Vec::new())
//!     }
//! }
//! ```

use async_trait::async_trait;

use std::collections::HashSet;

pub mod skip;
pub mod types;

#[doc(hidden)]
pub mod mock;

pub use crate::types::{
    Category, Check, MatchError, MatcherRequest, Rule, RuleMatch, TextBlock, TextRange,
};

/// A rule engine the pool can dispatch text blocks to.
///
/// Implementations must be safe to call concurrently from multiple workers;
/// the pool makes no effort to serialise calls to a single matcher.
#[async_trait]
pub trait Matcher: Send + Sync {
    /// Stable identifier for this matcher.
    ///
    /// Returning `None` asks the pool to assign a monotonically unique id
    /// at registration time.
    fn id(&self) -> Option<String> {
        None
    }

    /// The engine kind, e.g. `"regex"` or `"validator"`. Reported on every
    /// match this engine produces.
    fn kind(&self) -> &str;

    /// The categories this matcher can check.
    fn categories(&self) -> HashSet<Category>;

    /// Examine the request's blocks and report any rule violations.
    ///
    /// Positions in the returned matches are document coordinates of the
    /// blocks *as received*; when blocks were elided the pool re-projects
    /// the positions afterwards. Errors are surfaced to the caller of the
    /// originating check verbatim.
    async fn check(&self, request: MatcherRequest) -> Result<Vec<RuleMatch>, MatchError>;
}
