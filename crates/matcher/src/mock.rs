//! Canned matchers for tests, demos, and benches.
//!
//! These implement the [`Matcher`](crate::Matcher) capability with fully
//! predictable behaviour: fixed responses, deliberate failures, configurable
//! latency, or a check that never completes. Production deployments plug in
//! real engines instead.

use async_trait::async_trait;
use tokio::time::sleep;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::types::{Category, MatchError, MatcherRequest, Rule, RuleMatch};
use crate::Matcher;

/// The matcher `type` string reported by every mock in this module.
pub const MOCK_MATCHER_TYPE: &str = "mock";

/// Category used by mock matcher `n`: id `mock-category-{n}`.
pub fn mock_category(n: usize) -> Category {
    Category::new(format!("mock-category-{n}"), format!("Mock category {n}"))
}

/// A rule belonging to the given category.
pub fn mock_rule(category: &Category) -> Rule {
    Rule {
        id: format!("{}-rule", category.id),
        category_id: category.id.clone(),
        description: format!("canned rule for {}", category.id),
        suggestion: None,
    }
}

/// A match for `category` spanning `from..=to` with the given message.
pub fn mock_match(category: &Category, from: usize, to: usize, message: &str) -> RuleMatch {
    RuleMatch {
        rule: mock_rule(category),
        from_pos: from,
        to_pos: to,
        matched_text: String::new(),
        match_context: String::new(),
        message: message.to_string(),
        preceding_text: String::new(),
        subsequent_text: String::new(),
        matcher_type: MOCK_MATCHER_TYPE.to_string(),
    }
}

/// Returns fixed responses for every request and records what it received.
pub struct MockMatcher {
    id: String,
    categories: HashSet<Category>,
    responses: Vec<RuleMatch>,
    delay: Option<Duration>,
    received: Arc<Mutex<Vec<MatcherRequest>>>,
}

impl MockMatcher {
    /// Mock matcher `n`, covering `mock-category-{n}`, with no responses.
    pub fn new(n: usize) -> Self {
        Self {
            id: format!("mock-matcher-{n}"),
            categories: HashSet::from([mock_category(n)]),
            responses: Vec::new(),
            delay: None,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_responses(mut self, responses: Vec<RuleMatch>) -> Self {
        self.responses = responses;
        self
    }

    /// Sleep this long before answering; useful for saturating the queue.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_categories(mut self, categories: HashSet<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Every request this matcher has been asked to check so far.
    pub fn received(&self) -> Vec<MatcherRequest> {
        self.received.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Matcher for MockMatcher {
    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn kind(&self) -> &str {
        MOCK_MATCHER_TYPE
    }

    fn categories(&self) -> HashSet<Category> {
        self.categories.clone()
    }

    async fn check(&self, request: MatcherRequest) -> Result<Vec<RuleMatch>, MatchError> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        Ok(self.responses.clone())
    }
}

/// Fails every check with a fixed message.
pub struct FailingMatcher {
    id: String,
    categories: HashSet<Category>,
    message: String,
}

impl FailingMatcher {
    pub fn new(n: usize, message: &str) -> Self {
        Self {
            id: format!("mock-matcher-{n}"),
            categories: HashSet::from([mock_category(n)]),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Matcher for FailingMatcher {
    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn kind(&self) -> &str {
        MOCK_MATCHER_TYPE
    }

    fn categories(&self) -> HashSet<Category> {
        self.categories.clone()
    }

    async fn check(&self, _request: MatcherRequest) -> Result<Vec<RuleMatch>, MatchError> {
        Err(MatchError::Failed(self.message.clone()))
    }
}

/// Never answers; its future stays pending forever.
pub struct HangingMatcher {
    id: String,
    categories: HashSet<Category>,
}

impl HangingMatcher {
    pub fn new(n: usize) -> Self {
        Self {
            id: format!("mock-matcher-{n}"),
            categories: HashSet::from([mock_category(n)]),
        }
    }
}

#[async_trait]
impl Matcher for HangingMatcher {
    fn id(&self) -> Option<String> {
        Some(self.id.clone())
    }

    fn kind(&self) -> &str {
        MOCK_MATCHER_TYPE
    }

    fn categories(&self) -> HashSet<Category> {
        self.categories.clone()
    }

    async fn check(&self, _request: MatcherRequest) -> Result<Vec<RuleMatch>, MatchError> {
        std::future::pending::<()>().await;
        unreachable!("pending future never resolves")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextBlock;

    #[tokio::test]
    async fn mock_matcher_records_requests_and_replies() {
        let category = mock_category(0);
        let matcher =
            MockMatcher::new(0).with_responses(vec![mock_match(&category, 0, 5, "test-response")]);

        let request = MatcherRequest {
            blocks: vec![TextBlock::new("b1", "Example text", 0)],
        };
        let matches = matcher.check(request.clone()).await.expect("mock check");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].message, "test-response");
        assert_eq!(matcher.received(), vec![request]);
    }

    #[tokio::test]
    async fn failing_matcher_surfaces_its_message() {
        let matcher = FailingMatcher::new(1, "Something went wrong");
        let err = matcher
            .check(MatcherRequest::default())
            .await
            .expect_err("must fail");
        assert_eq!(err.to_string(), "Something went wrong");
    }
}
