use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use matcher::{Check, Rule, RuleMatch, TextBlock, TextRange};
use pool::CheckOutcome;

/// Check request body.
///
/// Field names follow the public API convention (camelCase); conversion to
/// the engine types happens here so the core stays wire-format agnostic.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    /// Client-chosen id for the document being checked
    #[serde(default)]
    pub id: Option<String>,

    /// Rule-set identifier
    pub set_id: String,

    /// Categories to check; omitted or empty means all
    #[serde(default)]
    pub category_ids: Option<Vec<String>>,

    /// The document blocks to examine
    pub blocks: Vec<BlockInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInput {
    pub id: String,
    pub text: String,
    pub from: usize,
    pub to: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_ranges: Option<Vec<RangeInput>>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RangeInput {
    pub from: usize,
    pub to: usize,
}

/// Check response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    /// The text that was checked, blocks concatenated in request order
    pub input: String,
    pub results: CheckResults,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResults {
    /// Ids of every category the check dispatched to, sorted
    pub category_ids: Vec<String>,
    pub matches: Vec<RuleMatchOutput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatchOutput {
    pub rule: RuleOutput,
    pub from_pos: usize,
    pub to_pos: usize,
    pub matched_text: String,
    pub match_context: String,
    pub message: String,
    pub preceding_text: String,
    pub subsequent_text: String,
    pub matcher_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutput {
    pub id: String,
    pub category_id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl From<BlockInput> for TextBlock {
    fn from(input: BlockInput) -> Self {
        TextBlock {
            id: input.id,
            text: input.text,
            from: input.from,
            to: input.to,
            skip_ranges: input.skip_ranges.map(|ranges| {
                ranges
                    .into_iter()
                    .map(|r| TextRange::new(r.from, r.to))
                    .collect()
            }),
        }
    }
}

impl From<CheckRequest> for Check {
    fn from(request: CheckRequest) -> Self {
        Check {
            document_id: request.id,
            set_id: request.set_id,
            category_ids: request
                .category_ids
                .map(|ids| ids.into_iter().collect::<HashSet<String>>()),
            blocks: request.blocks.into_iter().map(TextBlock::from).collect(),
        }
    }
}

impl From<Rule> for RuleOutput {
    fn from(rule: Rule) -> Self {
        Self {
            id: rule.id,
            category_id: rule.category_id,
            description: rule.description,
            suggestion: rule.suggestion,
        }
    }
}

impl From<RuleMatch> for RuleMatchOutput {
    fn from(rule_match: RuleMatch) -> Self {
        Self {
            rule: rule_match.rule.into(),
            from_pos: rule_match.from_pos,
            to_pos: rule_match.to_pos,
            matched_text: rule_match.matched_text,
            match_context: rule_match.match_context,
            message: rule_match.message,
            preceding_text: rule_match.preceding_text,
            subsequent_text: rule_match.subsequent_text,
            matcher_type: rule_match.matcher_type,
        }
    }
}

fn build_response(input: String, outcome: CheckOutcome) -> CheckResponse {
    let mut category_ids: Vec<String> = outcome.category_ids.into_iter().collect();
    category_ids.sort();
    CheckResponse {
        input,
        results: CheckResults {
            category_ids,
            matches: outcome
                .matches
                .into_iter()
                .map(RuleMatchOutput::from)
                .collect(),
        },
    }
}

/// Check a document's blocks against the registered matchers.
///
/// The pool plans jobs across matchers for the requested categories (all
/// categories when none are given), enforces its queue bound and per-job
/// timeout, and aggregates the matches. The response reports both the
/// matches and the category ids that were actually dispatched to, so
/// clients can tell "no violations" apart from "nothing was checked".
pub async fn check_document(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CheckRequest>,
) -> ServerResult<impl IntoResponse> {
    let input: String = request
        .blocks
        .iter()
        .map(|block| block.text.as_str())
        .collect();

    let check: Check = request.into();
    let outcome = state.pool.check(check).await?;

    Ok(Json(build_response(input, outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_camel_case_fields() {
        let request: CheckRequest = serde_json::from_str(
            r#"{
                "setId": "style-guide",
                "categoryIds": ["grammar"],
                "blocks": [
                    {"id": "b1", "text": "ABCDEF", "from": 0, "to": 6,
                     "skipRanges": [{"from": 0, "to": 0}]}
                ]
            }"#,
        )
        .unwrap();

        let check: Check = request.into();
        assert_eq!(check.set_id, "style-guide");
        assert_eq!(
            check.category_ids,
            Some(HashSet::from(["grammar".to_string()]))
        );
        assert_eq!(check.blocks[0].skip_ranges.as_deref().unwrap().len(), 1);
    }

    #[test]
    fn response_sorts_category_ids_and_uses_camel_case() {
        let outcome = CheckOutcome {
            category_ids: HashSet::from(["zeta".to_string(), "alpha".to_string()]),
            matches: Vec::new(),
        };
        let response = build_response("Example text".into(), outcome);
        assert_eq!(response.results.category_ids, vec!["alpha", "zeta"]);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("categoryIds"));
        assert!(json.contains("\"input\":\"Example text\""));
    }
}
