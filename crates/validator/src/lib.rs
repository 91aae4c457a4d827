//! # Checkpool Validator (`validator`)
//!
//! ## Purpose
//!
//! A *validator* is an external-facing check: it owns exactly one synthetic
//! category, carries its own rule list, and its check may fan out to
//! asynchronous external calls (e.g. resolving names against a search
//! service before synthesising matches). [`ValidatorMatcher`] adapts any
//! [`Validator`] into an ordinary [`Matcher`], so the pool schedules,
//! times out, and aggregates validators exactly like every other engine.
//!
//! ## Wiring
//!
//! ```ignore
//! let validator: Arc<dyn Validator> = Arc::new(NameCheckValidator::new(search_client));
//! pool.add_matcher(Arc::new(ValidatorMatcher::new(validator)));
//! ```

use async_trait::async_trait;

use std::collections::HashSet;
use std::sync::Arc;

use matcher::{Category, MatchError, Matcher, MatcherRequest, Rule, RuleMatch, TextBlock};

/// The matcher `type` string reported for adapted validators.
pub const VALIDATOR_MATCHER_TYPE: &str = "validator";

/// A validator's view of a check: the blocks to examine plus the id of the
/// originating document when the caller supplied one.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRequest {
    pub document_id: Option<String>,
    pub blocks: Vec<TextBlock>,
}

/// An external-facing check with a single synthetic category.
#[async_trait]
pub trait Validator: Send + Sync {
    /// The synthetic category id this validator reports under.
    fn category(&self) -> String;

    /// The rules this validator can raise.
    fn rules(&self) -> Vec<Rule>;

    /// Examine the request's blocks, possibly via asynchronous external
    /// calls, and synthesise rule matches.
    async fn check(&self, request: ValidatorRequest) -> Result<Vec<RuleMatch>, MatchError>;
}

/// Presents a [`Validator`] as a [`Matcher`] covering one category.
pub struct ValidatorMatcher {
    validator: Arc<dyn Validator>,
}

impl ValidatorMatcher {
    pub fn new(validator: Arc<dyn Validator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl Matcher for ValidatorMatcher {
    fn id(&self) -> Option<String> {
        Some(format!("validator-{}", self.validator.category()))
    }

    fn kind(&self) -> &str {
        VALIDATOR_MATCHER_TYPE
    }

    fn categories(&self) -> HashSet<Category> {
        let id = self.validator.category();
        HashSet::from([Category::new(id.clone(), id)])
    }

    async fn check(&self, request: MatcherRequest) -> Result<Vec<RuleMatch>, MatchError> {
        tracing::trace!(
            category = %self.validator.category(),
            blocks = request.blocks.len(),
            "validator.check"
        );
        self.validator
            .check(ValidatorRequest {
                document_id: None,
                blocks: request.blocks,
            })
            .await
    }
}
