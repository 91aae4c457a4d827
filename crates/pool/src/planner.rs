//! Check planning.
//!
//! A strategy expands one [`Check`] into the flat list of [`Job`]s the
//! queue will carry. Planning is a pure function of the check, the
//! matchers selected for it, and the resolved category ids, so the two
//! strategies can be exercised without a running pool.

use matcher::skip::elide_block;
use matcher::{Check, MatcherRequest, TextBlock, TextRange};

use std::collections::HashSet;

use crate::config::CheckStrategy;
use crate::registry::RegisteredMatcher;

/// A block after skipped-range elision, paired with the ranges that were
/// removed so match offsets can be projected back.
#[derive(Debug, Clone)]
pub struct PlannedBlock {
    pub elided: TextBlock,
    pub skipped: Vec<TextRange>,
}

impl PlannedBlock {
    fn from_block(block: &TextBlock) -> Self {
        Self {
            elided: elide_block(block),
            skipped: block.skip_ranges.clone().unwrap_or_default(),
        }
    }
}

/// One unit of work for one matcher.
#[derive(Debug, Clone)]
pub struct Job {
    /// Id of the originating check, for logs and metrics.
    pub check_id: String,
    pub matcher: RegisteredMatcher,
    /// The category ids this job covers: the matcher's categories
    /// intersected with the check's resolved set.
    pub category_ids: HashSet<String>,
    pub blocks: Vec<PlannedBlock>,
}

impl Job {
    /// The request handed to the matcher: the elided blocks only.
    pub fn request(&self) -> MatcherRequest {
        MatcherRequest {
            blocks: self.blocks.iter().map(|b| b.elided.clone()).collect(),
        }
    }
}

/// Expand a check into jobs under the given strategy.
///
/// `matchers` must already be filtered to those whose categories intersect
/// `resolved`; a matcher whose intersection turns out empty produces no
/// job.
pub fn plan(
    strategy: CheckStrategy,
    check_id: &str,
    check: &Check,
    matchers: &[RegisteredMatcher],
    resolved: &HashSet<String>,
) -> Vec<Job> {
    let planned_blocks: Vec<PlannedBlock> =
        check.blocks.iter().map(PlannedBlock::from_block).collect();

    let mut jobs = Vec::new();
    for registered in matchers {
        let category_ids: HashSet<String> = registered
            .matcher
            .categories()
            .into_iter()
            .map(|category| category.id)
            .filter(|id| resolved.contains(id))
            .collect();
        if category_ids.is_empty() {
            continue;
        }

        match strategy {
            CheckStrategy::DocumentPerCategory => {
                jobs.push(Job {
                    check_id: check_id.to_string(),
                    matcher: registered.clone(),
                    category_ids,
                    blocks: planned_blocks.clone(),
                });
            }
            CheckStrategy::BlockLevel => {
                for block in &planned_blocks {
                    jobs.push(Job {
                        check_id: check_id.to_string(),
                        matcher: registered.clone(),
                        category_ids: category_ids.clone(),
                        blocks: vec![block.clone()],
                    });
                }
            }
        }
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcher::mock::{mock_category, MockMatcher};
    use matcher::Matcher;

    use std::sync::Arc;

    fn registered(n: usize) -> RegisteredMatcher {
        let matcher = Arc::new(MockMatcher::new(n));
        RegisteredMatcher {
            id: Matcher::id(matcher.as_ref()).unwrap(),
            matcher,
        }
    }

    fn two_block_check() -> Check {
        Check {
            set_id: "set-1".into(),
            blocks: vec![
                TextBlock::new("b1", "first block", 0),
                TextBlock::new("b2", "second block", 11),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn document_strategy_emits_one_job_per_matcher() {
        let matchers = vec![registered(0), registered(1)];
        let resolved: HashSet<String> =
            ["mock-category-0", "mock-category-1"].map(String::from).into();

        let jobs = plan(
            CheckStrategy::DocumentPerCategory,
            "check-1",
            &two_block_check(),
            &matchers,
            &resolved,
        );

        assert_eq!(jobs.len(), 2);
        for job in &jobs {
            assert_eq!(job.blocks.len(), 2);
            assert_eq!(job.category_ids.len(), 1);
            assert_eq!(job.request().blocks.len(), 2);
        }
    }

    #[test]
    fn block_strategy_emits_one_job_per_matcher_block_pair() {
        let matchers = vec![registered(0), registered(1)];
        let resolved: HashSet<String> =
            ["mock-category-0", "mock-category-1"].map(String::from).into();

        let jobs = plan(
            CheckStrategy::BlockLevel,
            "check-1",
            &two_block_check(),
            &matchers,
            &resolved,
        );

        assert_eq!(jobs.len(), 4);
        assert!(jobs.iter().all(|job| job.blocks.len() == 1));
    }

    #[test]
    fn matcher_outside_resolved_categories_gets_no_job() {
        let matchers = vec![registered(0), registered(1)];
        let resolved: HashSet<String> = HashSet::from(["mock-category-0".to_string()]);

        let jobs = plan(
            CheckStrategy::DocumentPerCategory,
            "check-1",
            &two_block_check(),
            &matchers,
            &resolved,
        );

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].matcher.id, "mock-matcher-0");
    }

    #[test]
    fn planned_blocks_are_elided() {
        let check = Check {
            set_id: "set-1".into(),
            blocks: vec![TextBlock::new("b1", "ABCDEF", 0).with_skip_ranges(vec![
                TextRange::new(0, 0),
                TextRange::new(2, 2),
                TextRange::new(4, 4),
            ])],
            ..Default::default()
        };
        let matchers = vec![registered(0)];
        let resolved = HashSet::from(["mock-category-0".to_string()]);

        let jobs = plan(
            CheckStrategy::DocumentPerCategory,
            "check-1",
            &check,
            &matchers,
            &resolved,
        );

        assert_eq!(jobs[0].blocks[0].elided.text, "BDF");
        assert_eq!(jobs[0].blocks[0].skipped.len(), 3);
        assert!(jobs[0].request().blocks[0].skip_ranges.is_none());
    }

    #[test]
    fn category_ids_are_intersection_of_matcher_and_resolved() {
        let matcher = Arc::new(MockMatcher::new(0).with_categories(
            [mock_category(0), mock_category(1)].into_iter().collect(),
        ));
        let matchers = vec![RegisteredMatcher {
            id: "wide".into(),
            matcher,
        }];
        let resolved = HashSet::from(["mock-category-1".to_string()]);

        let jobs = plan(
            CheckStrategy::DocumentPerCategory,
            "check-1",
            &two_block_check(),
            &matchers,
            &resolved,
        );

        assert_eq!(jobs.len(), 1);
        assert_eq!(
            jobs[0].category_ids,
            HashSet::from(["mock-category-1".to_string()])
        );
    }
}
