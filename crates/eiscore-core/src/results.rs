//! Result types produced by scoring single responses and batches.

use serde::{Deserialize, Serialize};

use crate::model::Scale;

/// Name recorded for the exact-match fast path.
pub const EXACT_MATCH_RULE: &str = "exact-match";

/// Name recorded when no rule matched and the floor score applied.
pub const FLOOR_RULE: &str = "floor";

/// One evaluated rule in a cascade run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTrace {
    /// Rule name.
    pub rule: String,
    /// Whether the rule's predicate held.
    pub matched: bool,
    /// What the predicate found, when it matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RuleTrace {
    pub(crate) fn matched(rule: &str, detail: Option<String>) -> Self {
        Self {
            rule: rule.to_string(),
            matched: true,
            detail,
        }
    }

    pub(crate) fn missed(rule: &str) -> Self {
        Self {
            rule: rule.to_string(),
            matched: false,
            detail: None,
        }
    }
}

/// The outcome of scoring one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// The ordinal score.
    pub score: u8,
    /// The scale the score belongs to.
    pub scale: Scale,
    /// Name of the rule that decided the score.
    pub rule: String,
    /// Every rule evaluated, in order, up to and including the deciding one.
    pub trace: Vec<RuleTrace>,
}

impl ScoreResult {
    pub fn is_exact_match(&self) -> bool {
        self.rule == EXACT_MATCH_RULE
    }

    pub fn is_floor(&self) -> bool {
        self.rule == FLOOR_RULE
    }
}

/// A response queued for batch scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Position in the input; results are reported in this order.
    pub row: usize,
    /// Caller-supplied identifier (participant, file name).
    pub response_id: String,
    /// The transcribed response.
    pub text: String,
}

/// What happened to one response in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseOutcome {
    Scored(ScoreResult),
    Failed { error: String, attempts: u32 },
}

/// A scored (or failed) response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseResult {
    pub row: usize,
    pub response_id: String,
    pub response: String,
    pub outcome: ResponseOutcome,
}

impl ResponseResult {
    /// The score, if the response was scored.
    pub fn score(&self) -> Option<u8> {
        match &self.outcome {
            ResponseOutcome::Scored(result) => Some(result.score),
            ResponseOutcome::Failed { .. } => None,
        }
    }

    pub fn score_result(&self) -> Option<&ScoreResult> {
        match &self.outcome {
            ResponseOutcome::Scored(result) => Some(result),
            ResponseOutcome::Failed { .. } => None,
        }
    }
}
