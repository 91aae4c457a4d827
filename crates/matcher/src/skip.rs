//! Skipped-range transform.
//!
//! Blocks may mark character ranges that must never reach a matcher
//! (tracked changes, placeholders, embedded markup). [`elide_block`] removes
//! those characters before dispatch; [`reproject_position`] maps positions a
//! matcher reported against the elided text back into the coordinates of
//! the original document. Both operations are pure.

use crate::types::{RuleMatch, TextBlock, TextRange};

/// Remove every character covered by the block's skip ranges.
///
/// The elided block keeps the original `from`; `to` shrinks to
/// `from + len(elided text)` and the result carries no skip ranges.
/// Ranges are interpreted as sorted, non-overlapping document offsets
/// (see [`TextBlock::validate`]).
pub fn elide_block(block: &TextBlock) -> TextBlock {
    let ranges = match block.skip_ranges.as_deref() {
        Some(ranges) if !ranges.is_empty() => ranges,
        _ => {
            let mut elided = block.clone();
            elided.skip_ranges = None;
            return elided;
        }
    };

    let mut kept = String::with_capacity(block.text.len());
    let mut next_range = 0;
    for (offset, ch) in block.text.chars().enumerate() {
        let pos = block.from + offset;
        while next_range < ranges.len() && ranges[next_range].to < pos {
            next_range += 1;
        }
        let skipped = next_range < ranges.len() && ranges[next_range].contains(pos);
        if !skipped {
            kept.push(ch);
        }
    }

    let to = block.from + kept.chars().count();
    TextBlock {
        id: block.id.clone(),
        text: kept,
        from: block.from,
        to,
        skip_ranges: None,
    }
}

/// Map a position reported against elided text back to document coordinates.
///
/// Walks the skipped ranges in ascending order; every range that starts at
/// or before the candidate position pushes it right by the range's width.
pub fn reproject_position(pos: usize, skipped: &[TextRange]) -> usize {
    let mut candidate = pos;
    for range in skipped {
        if range.from <= candidate {
            candidate += range.len();
        }
    }
    candidate
}

/// Re-project both endpoints of a match through the block's skipped ranges.
pub fn reproject_match(mut rule_match: RuleMatch, skipped: &[TextRange]) -> RuleMatch {
    if skipped.is_empty() {
        return rule_match;
    }
    rule_match.from_pos = reproject_position(rule_match.from_pos, skipped);
    rule_match.to_pos = reproject_position(rule_match.to_pos, skipped);
    rule_match
}
