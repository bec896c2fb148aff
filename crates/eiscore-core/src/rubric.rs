//! Ordered first-match-wins rule cascades.
//!
//! A cascade is a list of named predicates, each paired with the score it
//! awards, plus the scale those scores live on. Evaluation walks the list
//! top-down and stops at the first predicate that holds; a response that
//! satisfies several rules gets the score of the earliest one. If nothing
//! matches, the scale's minimum applies.
//!
//! The exact-match check sits in front of every cascade and is handled here
//! rather than as a rule, because it must run before annotation.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::ConfigurationError;
use crate::model::{Construct, Scale, TaggedSentence, TargetSpecification};
use crate::results::{RuleTrace, ScoreResult, EXACT_MATCH_RULE, FLOOR_RULE};

/// Everything a rule predicate may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub target: &'a TargetSpecification,
    pub sentence: &'a TaggedSentence,
}

/// A rule predicate. Returns a short description of what it found when it
/// matches, `None` otherwise.
pub type Predicate = Arc<dyn Fn(&RuleContext<'_>) -> Option<String> + Send + Sync>;

/// One entry of a cascade.
#[derive(Clone)]
pub struct Rule {
    name: String,
    score: u8,
    predicate: Predicate,
}

impl Rule {
    pub fn new<F>(name: impl Into<String>, score: u8, predicate: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            score,
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        (self.predicate)(ctx)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

/// An immutable, validated rule cascade for one construct and scale.
#[derive(Debug, Clone)]
pub struct RuleCascade {
    construct: Construct,
    scale: Scale,
    rules: Vec<Rule>,
}

impl RuleCascade {
    pub fn builder(construct: Construct, scale: Scale) -> RuleCascadeBuilder {
        RuleCascadeBuilder {
            construct,
            scale,
            rules: Vec::new(),
        }
    }

    pub fn construct(&self) -> Construct {
        self.construct
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn max_score(&self) -> u8 {
        self.scale.max
    }

    pub fn floor(&self) -> u8 {
        self.scale.min
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The fast path: a verbatim reproduction of the target earns the top of
    /// the scale without annotation.
    pub fn exact_match(&self, target: &TargetSpecification, response: &str) -> Option<ScoreResult> {
        if !target.is_exact_match(response) {
            return None;
        }

        debug!(construct = %self.construct, "response matches target verbatim");
        Some(ScoreResult {
            score: self.scale.max,
            scale: self.scale,
            rule: EXACT_MATCH_RULE.to_string(),
            trace: vec![RuleTrace::matched(EXACT_MATCH_RULE, None)],
        })
    }

    /// Evaluate the rules against an annotated response. Total: every input
    /// resolves to exactly one score.
    pub fn evaluate(&self, target: &TargetSpecification, sentence: &TaggedSentence) -> ScoreResult {
        let ctx = RuleContext { target, sentence };
        let mut trace = vec![RuleTrace::missed(EXACT_MATCH_RULE)];

        for rule in &self.rules {
            match rule.check(&ctx) {
                Some(detail) => {
                    debug!(rule = rule.name(), score = rule.score(), %detail, "rule matched");
                    trace.push(RuleTrace::matched(rule.name(), Some(detail)));
                    return ScoreResult {
                        score: rule.score(),
                        scale: self.scale,
                        rule: rule.name().to_string(),
                        trace,
                    };
                }
                None => {
                    debug!(rule = rule.name(), "rule did not match");
                    trace.push(RuleTrace::missed(rule.name()));
                }
            }
        }

        trace.push(RuleTrace::matched(FLOOR_RULE, None));
        ScoreResult {
            score: self.scale.min,
            scale: self.scale,
            rule: FLOOR_RULE.to_string(),
            trace,
        }
    }
}

/// Builder that validates rule scores against the declared scale.
#[derive(Debug)]
pub struct RuleCascadeBuilder {
    construct: Construct,
    scale: Scale,
    rules: Vec<Rule>,
}

impl RuleCascadeBuilder {
    /// Append a rule. Rules are evaluated in the order they are added.
    pub fn rule<F>(mut self, name: impl Into<String>, score: u8, predicate: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.rules.push(Rule::new(name, score, predicate));
        self
    }

    pub fn build(self) -> Result<RuleCascade, ConfigurationError> {
        for rule in &self.rules {
            if !self.scale.contains(rule.score) {
                return Err(ConfigurationError::RuleScoreOutOfRange {
                    rule: rule.name.clone(),
                    score: rule.score,
                    min: self.scale.min,
                    max: self.scale.max,
                });
            }
        }

        Ok(RuleCascade {
            construct: self.construct,
            scale: self.scale,
            rules: self.rules,
        })
    }
}
