//! Batch report types with JSON persistence and run-to-run comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Construct, Scale};
use crate::results::ResponseResult;
use crate::statistics::{compute_agreement, Agreement, ScoreStats};

/// A complete batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The item the responses were scored against.
    pub item: ItemSummary,
    /// Per-response results, in input order.
    pub results: Vec<ResponseResult>,
    /// Aggregate statistics.
    pub stats: ScoreStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of the scored item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    pub construct: Construct,
    pub scale: Scale,
    pub target: String,
}

impl BatchReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: BatchReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline scoring of the same responses.
    /// Responses are paired by `response_id`; a repeated id pairs its n-th
    /// occurrence in each report. Failed responses on either side are left
    /// out of the agreement figures.
    pub fn compare(&self, baseline: &BatchReport) -> ScoreComparison {
        let mut baseline_scores: HashMap<(&str, usize), Option<u8>> = HashMap::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for result in &baseline.results {
            let key = occurrence_key(&mut seen, &result.response_id);
            baseline_scores.insert(key, result.score());
        }

        let mut changed = Vec::new();
        let mut unchanged = 0usize;
        let mut new_responses = 0usize;
        let mut pairs = Vec::new();

        seen.clear();
        for result in &self.results {
            let current = result.score();
            let key = occurrence_key(&mut seen, &result.response_id);
            let Some(previous) = baseline_scores.remove(&key) else {
                new_responses += 1;
                continue;
            };

            if let (Some(b), Some(c)) = (previous, current) {
                pairs.push((b, c));
            }

            if previous == current {
                unchanged += 1;
            } else {
                changed.push(ScoreChange {
                    response_id: result.response_id.clone(),
                    response: result.response.clone(),
                    baseline_score: previous,
                    current_score: current,
                    current_rule: result.score_result().map(|s| s.rule.clone()),
                });
            }
        }

        // whatever is left in the baseline had no counterpart
        let removed_responses = baseline_scores.len();

        let scale = Scale::new(
            self.item.scale.min.min(baseline.item.scale.min),
            self.item.scale.max.max(baseline.item.scale.max),
        );

        ScoreComparison {
            changed,
            unchanged,
            new_responses,
            removed_responses,
            agreement: compute_agreement(&pairs, scale),
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreComparison {
    /// Responses whose score (or scored/failed status) differs.
    pub changed: Vec<ScoreChange>,
    /// Responses with the same outcome in both runs.
    pub unchanged: usize,
    /// Responses in current but not baseline.
    pub new_responses: usize,
    /// Responses in baseline but not current.
    pub removed_responses: usize,
    /// Agreement over responses scored in both runs.
    pub agreement: Agreement,
}

/// A response whose score differs between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreChange {
    pub response_id: String,
    pub response: String,
    pub baseline_score: Option<u8>,
    pub current_score: Option<u8>,
    pub current_rule: Option<String>,
}

/// `(id, n)` for the n-th time `id` has been seen.
fn occurrence_key<'a>(seen: &mut HashMap<&'a str, usize>, id: &'a str) -> (&'a str, usize) {
    let count = seen.entry(id).or_default();
    let key = (id, *count);
    *count += 1;
    key
}

fn cell(score: Option<u8>) -> String {
    score.map_or_else(|| "failed".to_string(), |s| s.to_string())
}

impl ScoreComparison {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} changed, {} unchanged, {} new, {} removed\n\n",
            self.changed.len(),
            self.unchanged,
            self.new_responses,
            self.removed_responses
        ));

        md.push_str(&format!(
            "**Agreement:** {:.1}% exact, {:.1}% adjacent, QWK {}\n\n",
            self.agreement.exact * 100.0,
            self.agreement.adjacent * 100.0,
            self.agreement
                .quadratic_kappa
                .map_or_else(|| "n/a".to_string(), |k| format!("{k:.3}"))
        ));

        if !self.changed.is_empty() {
            md.push_str("### Changed scores\n\n");
            md.push_str("| Response | Baseline | Current | Rule |\n");
            md.push_str("|----------|----------|---------|------|\n");
            for c in &self.changed {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    c.response_id,
                    cell(c.baseline_score),
                    cell(c.current_score),
                    c.current_rule.as_deref().unwrap_or("-")
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any response changed.
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{ResponseOutcome, RuleTrace, ScoreResult};
    use crate::statistics::compute_score_stats;

    fn result(id: &str, score: Option<u8>) -> ResponseResult {
        let outcome = match score {
            Some(score) => ResponseOutcome::Scored(ScoreResult {
                score,
                scale: Scale::new(0, 4),
                rule: "copula-participle".into(),
                trace: vec![RuleTrace::matched("copula-participle", None)],
            }),
            None => ResponseOutcome::Failed {
                error: "corenlp unavailable".into(),
                attempts: 4,
            },
        };
        ResponseResult {
            row: 0,
            response_id: id.into(),
            response: format!("response {id}"),
            outcome,
        }
    }

    fn make_report(results: Vec<ResponseResult>) -> BatchReport {
        let stats = compute_score_stats(&results);
        BatchReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            item: ItemSummary {
                id: "passive-allow".into(),
                construct: Construct::BePassive,
                scale: Scale::new(0, 4),
                target: "Children are allowed.".into(),
            },
            results,
            stats,
            duration_ms: 0,
        }
    }

    #[test]
    fn compare_identical_reports() {
        let baseline = make_report(vec![result("p1", Some(3)), result("p2", Some(1))]);
        let current = baseline.clone();

        let comparison = current.compare(&baseline);
        assert!(!comparison.has_changes());
        assert_eq!(comparison.unchanged, 2);
        assert_eq!(comparison.agreement.exact, 1.0);
    }

    #[test]
    fn compare_with_changes() {
        let baseline = make_report(vec![
            result("p1", Some(3)),
            result("p2", Some(1)),
            result("p3", None),
        ]);
        let current = make_report(vec![
            result("p1", Some(2)),
            result("p2", Some(1)),
            result("p3", Some(0)),
        ]);

        let comparison = current.compare(&baseline);
        assert_eq!(comparison.changed.len(), 2);
        assert_eq!(comparison.unchanged, 1);
        // p3 failed in the baseline so only two pairs count
        assert_eq!(comparison.agreement.pairs, 2);
        assert_eq!(comparison.agreement.exact, 0.5);
        assert_eq!(comparison.agreement.adjacent, 1.0);
    }

    #[test]
    fn compare_pairs_repeated_ids_in_order() {
        let baseline = make_report(vec![result("p1", Some(4)), result("p1", Some(0))]);
        let comparison = baseline.clone().compare(&baseline);
        assert_eq!(comparison.changed.len(), 0);
        assert_eq!(comparison.unchanged, 2);
        assert_eq!(comparison.agreement.pairs, 2);
        assert_eq!(comparison.agreement.exact, 1.0);

        let current = make_report(vec![
            result("p1", Some(4)),
            result("p1", Some(1)),
            result("p1", Some(2)),
        ]);
        let comparison = current.compare(&baseline);
        assert_eq!(comparison.unchanged, 1);
        assert_eq!(comparison.changed.len(), 1);
        assert_eq!(comparison.changed[0].baseline_score, Some(0));
        assert_eq!(comparison.changed[0].current_score, Some(1));
        assert_eq!(comparison.new_responses, 1);
        assert_eq!(comparison.removed_responses, 0);
    }

    #[test]
    fn inverted_scale_report_fails_to_load() {
        let report = make_report(vec![result("p1", Some(4))]);
        let mut json = serde_json::to_value(&report).unwrap();
        json["item"]["scale"] = serde_json::json!({"min": 4, "max": 0});

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

        let err = BatchReport::load_json(&path).unwrap_err();
        assert!(format!("{err:#}").contains("inverted scale 4-0"));
    }

    #[test]
    fn compare_with_new_and_removed() {
        let baseline = make_report(vec![result("old", Some(1))]);
        let current = make_report(vec![result("new", Some(1))]);

        let comparison = current.compare(&baseline);
        assert_eq!(comparison.new_responses, 1);
        assert_eq!(comparison.removed_responses, 1);
        assert_eq!(comparison.agreement.quadratic_kappa, None);
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(vec![result("p1", Some(4)), result("p2", None)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = BatchReport::load_json(&path).unwrap();

        assert_eq!(loaded.item.id, "passive-allow");
        assert_eq!(loaded.results.len(), 2);
        assert_eq!(loaded.results[1].score(), None);
        assert_eq!(loaded.stats, report.stats);
    }

    #[test]
    fn markdown_output() {
        let baseline = make_report(vec![result("p1", Some(3))]);
        let current = make_report(vec![result("p1", None)]);

        let md = current.compare(&baseline).to_markdown();
        assert!(md.contains("Changed scores"));
        assert!(md.contains("| p1 | 3 | failed | - |"));
    }
}
