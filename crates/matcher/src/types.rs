use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::collections::HashSet;

/// A named grouping of rules.
///
/// Categories are what callers filter checks by and what the pool reports
/// coverage in. Two matchers may declare the same category id; the category
/// then spans both engines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Category {
    /// Stable identifier, unique across the deployment.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Optional display colour (e.g. a hex triplet) for UIs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }
}

/// An inclusive-inclusive range of character positions.
///
/// A single character has `from == to`. Positions are Unicode scalar
/// offsets in document coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub from: usize,
    pub to: usize,
}

impl TextRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Number of characters covered by the range.
    pub fn len(&self) -> usize {
        self.to - self.from + 1
    }

    /// Whether `pos` falls inside the range.
    pub fn contains(&self, pos: usize) -> bool {
        self.from <= pos && pos <= self.to
    }
}

/// One contiguous region of the source document.
///
/// `from`/`to` are character offsets in the document; `text` is that slice,
/// so `to - from` always equals the character count of `text`. `skip_ranges`
/// marks characters (in document coordinates) that must be elided before a
/// matcher sees the block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextBlock {
    pub id: String,
    pub text: String,
    pub from: usize,
    pub to: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_ranges: Option<Vec<TextRange>>,
}

impl TextBlock {
    /// Build a block from text alone, deriving `to` from the character count.
    pub fn new(id: impl Into<String>, text: impl Into<String>, from: usize) -> Self {
        let text = text.into();
        let to = from + text.chars().count();
        Self {
            id: id.into(),
            text,
            from,
            to,
            skip_ranges: None,
        }
    }

    pub fn with_skip_ranges(mut self, ranges: Vec<TextRange>) -> Self {
        self.skip_ranges = Some(ranges);
        self
    }

    /// Character length of the block text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Verify the block's internal invariants.
    ///
    /// Skip ranges must be sorted ascending, non-overlapping, and fully
    /// contained within `[from, to)`.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.to < self.from {
            return Err(MatchError::InvalidBlock {
                block_id: self.id.clone(),
                reason: format!("to ({}) precedes from ({})", self.to, self.from),
            });
        }
        if self.to - self.from != self.char_len() {
            return Err(MatchError::InvalidBlock {
                block_id: self.id.clone(),
                reason: format!(
                    "span {}..{} does not cover {} characters of text",
                    self.from,
                    self.to,
                    self.char_len()
                ),
            });
        }

        let Some(ranges) = self.skip_ranges.as_deref() else {
            return Ok(());
        };
        let mut previous_end: Option<usize> = None;
        for range in ranges {
            if range.to < range.from {
                return Err(MatchError::InvalidBlock {
                    block_id: self.id.clone(),
                    reason: format!("skip range {}..{} is inverted", range.from, range.to),
                });
            }
            if range.from < self.from || range.to >= self.to {
                return Err(MatchError::InvalidBlock {
                    block_id: self.id.clone(),
                    reason: format!(
                        "skip range {}..{} falls outside block span {}..{}",
                        range.from, range.to, self.from, self.to
                    ),
                });
            }
            if let Some(end) = previous_end {
                if range.from <= end {
                    return Err(MatchError::InvalidBlock {
                        block_id: self.id.clone(),
                        reason: format!(
                            "skip range {}..{} overlaps or precedes an earlier range",
                            range.from, range.to
                        ),
                    });
                }
            }
            previous_end = Some(range.to);
        }
        Ok(())
    }
}

/// One caller-facing request to examine a document's blocks.
///
/// `category_ids == None` (or an explicitly empty set, which is treated the
/// same) means "every category the pool currently knows about".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Check {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub set_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<HashSet<String>>,
    pub blocks: Vec<TextBlock>,
}

impl Check {
    /// The requested category ids, with an empty set collapsed to `None`.
    pub fn requested_category_ids(&self) -> Option<&HashSet<String>> {
        match &self.category_ids {
            Some(ids) if !ids.is_empty() => Some(ids),
            _ => None,
        }
    }

    /// Verify the check's internal invariants.
    ///
    /// Each block must validate and block ids must be unique within the
    /// check.
    pub fn validate(&self) -> Result<(), MatchError> {
        let mut seen = HashSet::with_capacity(self.blocks.len());
        for block in &self.blocks {
            block.validate()?;
            if !seen.insert(block.id.as_str()) {
                return Err(MatchError::DuplicateBlockId(block.id.clone()));
            }
        }
        Ok(())
    }
}

/// What actually reaches a matcher after category filtering and
/// skipped-range elision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MatcherRequest {
    pub blocks: Vec<TextBlock>,
}

/// A single rule as reported alongside a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    pub category_id: String,
    pub description: String,
    /// Optional replacement suggestion attached to the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// One reported rule violation.
///
/// Positions are character offsets in *document* coordinates; when a block
/// carried skip ranges the pool re-projects the matcher's offsets before
/// the match is delivered, so `from_pos`/`to_pos` always address the
/// original text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule: Rule,
    pub from_pos: usize,
    pub to_pos: usize,
    pub matched_text: String,
    pub match_context: String,
    pub message: String,
    pub preceding_text: String,
    pub subsequent_text: String,
    pub matcher_type: String,
}

/// Errors produced by the matcher layer.
#[derive(Debug, Error)]
pub enum MatchError {
    /// A block violates the data-model invariants.
    #[error("invalid block {block_id}: {reason}")]
    InvalidBlock { block_id: String, reason: String },
    /// Two blocks in one check share an id.
    #[error("duplicate block id: {0}")]
    DuplicateBlockId(String),
    /// The matcher itself failed; the message is surfaced verbatim.
    #[error("{0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_derives_to_from_char_count() {
        let block = TextBlock::new("b1", "héllo", 10);
        assert_eq!(block.to, 15);
        assert!(block.validate().is_ok());
    }

    #[test]
    fn block_span_mismatch_rejected() {
        let mut block = TextBlock::new("b1", "hello", 0);
        block.to = 99;
        let err = block.validate().expect_err("span should be invalid");
        assert!(err.to_string().contains("b1"));
    }

    #[test]
    fn overlapping_skip_ranges_rejected() {
        let block = TextBlock::new("b1", "hello world", 0)
            .with_skip_ranges(vec![TextRange::new(0, 3), TextRange::new(3, 5)]);
        let err = block.validate().expect_err("ranges overlap");
        assert!(matches!(err, MatchError::InvalidBlock { .. }));
    }

    #[test]
    fn skip_range_outside_block_rejected() {
        let block = TextBlock::new("b1", "hello", 10).with_skip_ranges(vec![TextRange::new(2, 4)]);
        assert!(block.validate().is_err());
    }

    #[test]
    fn duplicate_block_ids_rejected() {
        let check = Check {
            set_id: "set-1".into(),
            blocks: vec![TextBlock::new("b1", "one", 0), TextBlock::new("b1", "two", 3)],
            ..Default::default()
        };
        let err = check.validate().expect_err("duplicate ids");
        assert!(matches!(err, MatchError::DuplicateBlockId(id) if id == "b1"));
    }

    #[test]
    fn empty_category_set_collapses_to_none() {
        let check = Check {
            set_id: "set-1".into(),
            category_ids: Some(HashSet::new()),
            blocks: vec![],
            ..Default::default()
        };
        assert!(check.requested_category_ids().is_none());
    }

    #[test]
    fn single_char_range_has_len_one() {
        let range = TextRange::new(4, 4);
        assert_eq!(range.len(), 1);
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }
}
