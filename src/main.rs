use std::error::Error;
use std::sync::Arc;

use checkpool::{Check, MatcherPool, PoolConfig, TextBlock, TextRange};
use matcher::mock::{mock_category, mock_match, MockMatcher};

/// Small end-to-end demo: one mock matcher, one block with a redacted
/// character, matches printed in document coordinates.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let pool = MatcherPool::new(PoolConfig::default())?;

    let category = mock_category(0);
    pool.add_matcher(Arc::new(MockMatcher::new(0).with_responses(vec![
        mock_match(&category, 0, 6, "matches the opening word"),
    ])));

    let check = Check {
        document_id: Some("demo-doc".into()),
        set_id: "demo-set".into(),
        blocks: vec![
            TextBlock::new("p1", "*Example text", 0).with_skip_ranges(vec![TextRange::new(0, 0)]),
        ],
        ..Default::default()
    };

    let outcome = pool.check(check).await?;

    let mut category_ids: Vec<_> = outcome.category_ids.iter().cloned().collect();
    category_ids.sort();
    println!("checked categories: {category_ids:?}");
    for rule_match in &outcome.matches {
        println!(
            "{}..{} [{}] {}",
            rule_match.from_pos, rule_match.to_pos, rule_match.rule.category_id, rule_match.message
        );
    }

    Ok(())
}
