//! Score distributions and inter-run agreement.
//!
//! Agreement between two scorings of the same responses uses exact and
//! adjacent agreement plus quadratic weighted kappa, the usual measures for
//! ordinal rubric scores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Scale;
use crate::results::ResponseResult;

/// Summary statistics for one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    /// Responses submitted.
    pub total: usize,
    /// Responses that produced a score.
    pub scored: usize,
    /// Responses that failed annotation.
    pub failed: usize,
    /// Responses decided by the exact-match fast path.
    pub exact_matches: usize,
    /// Mean score over scored responses.
    pub mean: Option<f64>,
    /// Count per score value.
    pub distribution: BTreeMap<u8, usize>,
    /// Count per deciding rule.
    pub rule_hits: BTreeMap<String, usize>,
}

pub fn compute_score_stats(results: &[ResponseResult]) -> ScoreStats {
    let mut stats = ScoreStats {
        total: results.len(),
        ..Default::default()
    };
    let mut sum = 0u64;

    for result in results {
        let Some(score) = result.score_result() else {
            stats.failed += 1;
            continue;
        };
        stats.scored += 1;
        if score.is_exact_match() {
            stats.exact_matches += 1;
        }
        sum += u64::from(score.score);
        *stats.distribution.entry(score.score).or_default() += 1;
        *stats.rule_hits.entry(score.rule.clone()).or_default() += 1;
    }

    if stats.scored > 0 {
        stats.mean = Some(sum as f64 / stats.scored as f64);
    }
    stats
}

/// Agreement between paired scores on the same scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    /// Number of paired scores.
    pub pairs: usize,
    /// Fraction of pairs with identical scores.
    pub exact: f64,
    /// Fraction of pairs within one point.
    pub adjacent: f64,
    /// Quadratic weighted kappa; `None` when undefined (no pairs, or both
    /// sides constant on the same value).
    pub quadratic_kappa: Option<f64>,
}

/// Compare `(a, b)` score pairs on `scale`. Scores outside the scale are
/// clamped to its bounds. An inverted scale leaves kappa undefined.
pub fn compute_agreement(pairs: &[(u8, u8)], scale: Scale) -> Agreement {
    let n = pairs.len();
    if n == 0 {
        return Agreement {
            pairs: 0,
            exact: 0.0,
            adjacent: 0.0,
            quadratic_kappa: None,
        };
    }

    let exact = pairs.iter().filter(|(a, b)| a == b).count();
    let adjacent = pairs.iter().filter(|(a, b)| a.abs_diff(*b) <= 1).count();

    Agreement {
        pairs: n,
        exact: exact as f64 / n as f64,
        adjacent: adjacent as f64 / n as f64,
        quadratic_kappa: quadratic_weighted_kappa(pairs, scale),
    }
}

fn quadratic_weighted_kappa(pairs: &[(u8, u8)], scale: Scale) -> Option<f64> {
    let k = scale.levels()?;
    if k < 2 || pairs.is_empty() {
        return None;
    }
    let index = |s: u8| usize::from(s.clamp(scale.min, scale.max) - scale.min);

    let mut observed = vec![vec![0f64; k]; k];
    let mut row_totals = vec![0f64; k];
    let mut col_totals = vec![0f64; k];
    for &(a, b) in pairs {
        let (i, j) = (index(a), index(b));
        observed[i][j] += 1.0;
        row_totals[i] += 1.0;
        col_totals[j] += 1.0;
    }

    let n = pairs.len() as f64;
    let denom = ((k - 1) * (k - 1)) as f64;
    let mut weighted_observed = 0.0;
    let mut weighted_expected = 0.0;
    for i in 0..k {
        for j in 0..k {
            let weight = ((i as f64 - j as f64).powi(2)) / denom;
            weighted_observed += weight * observed[i][j];
            weighted_expected += weight * row_totals[i] * col_totals[j] / n;
        }
    }

    if weighted_expected == 0.0 {
        return None;
    }
    Some(1.0 - weighted_observed / weighted_expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{ResponseOutcome, RuleTrace, ScoreResult};

    fn scored(row: usize, score: u8, rule: &str) -> ResponseResult {
        ResponseResult {
            row,
            response_id: format!("r{row}"),
            response: String::new(),
            outcome: ResponseOutcome::Scored(ScoreResult {
                score,
                scale: Scale::new(0, 4),
                rule: rule.into(),
                trace: vec![RuleTrace::matched(rule, None)],
            }),
        }
    }

    fn failed(row: usize) -> ResponseResult {
        ResponseResult {
            row,
            response_id: format!("r{row}"),
            response: String::new(),
            outcome: ResponseOutcome::Failed {
                error: "annotator timed out".into(),
                attempts: 4,
            },
        }
    }

    #[test]
    fn stats_count_scores_and_failures() {
        let results = vec![
            scored(0, 4, "exact-match"),
            scored(1, 2, "bare-participle"),
            scored(2, 2, "bare-participle"),
            scored(3, 0, "floor"),
            failed(4),
        ];
        let stats = compute_score_stats(&results);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.scored, 4);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.exact_matches, 1);
        assert_eq!(stats.mean, Some(2.0));
        assert_eq!(stats.distribution.get(&2), Some(&2));
        assert_eq!(stats.rule_hits.get("bare-participle"), Some(&2));
    }

    #[test]
    fn stats_on_all_failures_have_no_mean() {
        let stats = compute_score_stats(&[failed(0)]);
        assert_eq!(stats.mean, None);
        assert!(stats.distribution.is_empty());
    }

    #[test]
    fn perfect_agreement() {
        let pairs = [(0, 0), (1, 1), (2, 2), (4, 4)];
        let agreement = compute_agreement(&pairs, Scale::new(0, 4));
        assert_eq!(agreement.exact, 1.0);
        assert_eq!(agreement.adjacent, 1.0);
        assert!((agreement.quadratic_kappa.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn adjacent_disagreement_keeps_kappa_high() {
        let pairs = [(0, 0), (1, 2), (2, 2), (3, 4), (4, 4)];
        let agreement = compute_agreement(&pairs, Scale::new(0, 4));
        assert!((agreement.exact - 0.6).abs() < 1e-9);
        assert_eq!(agreement.adjacent, 1.0);
        let kappa = agreement.quadratic_kappa.unwrap();
        assert!(kappa > 0.8 && kappa < 1.0, "kappa = {kappa}");
    }

    #[test]
    fn reversed_scores_have_negative_kappa() {
        let pairs = [(0, 1), (1, 0), (0, 1), (1, 0)];
        let agreement = compute_agreement(&pairs, Scale::new(0, 1));
        assert_eq!(agreement.exact, 0.0);
        assert!(agreement.quadratic_kappa.unwrap() < 0.0);
    }

    #[test]
    fn inverted_scale_leaves_kappa_undefined() {
        let agreement = compute_agreement(&[(0, 4), (4, 0)], Scale { min: 4, max: 0 });
        assert_eq!(agreement.pairs, 2);
        assert_eq!(agreement.exact, 0.0);
        assert_eq!(agreement.quadratic_kappa, None);
    }

    #[test]
    fn constant_scores_leave_kappa_undefined() {
        let agreement = compute_agreement(&[(2, 2), (2, 2)], Scale::new(0, 4));
        assert_eq!(agreement.exact, 1.0);
        assert_eq!(agreement.quadratic_kappa, None);
        assert_eq!(compute_agreement(&[], Scale::new(0, 4)).pairs, 0);
    }
}
