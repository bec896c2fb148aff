//! Markdown batch summary.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use eiscore_core::report::BatchReport;
use eiscore_core::results::ResponseOutcome;

/// Escape pipes so free text cannot break a table row.
fn md_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Render a batch report as a markdown summary.
pub fn generate_summary(report: &BatchReport) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    let _ = writeln!(md, "# eiscore summary: {}\n", report.item.id);
    let _ = writeln!(
        md,
        "- **Construct:** {}\n- **Scale:** {}\n- **Target:** {}\n- **Scored at:** {}\n",
        report.item.construct,
        report.item.scale,
        report.item.target,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let _ = writeln!(
        md,
        "**Responses:** {} total, {} scored, {} failed, {} exact matches",
        stats.total, stats.scored, stats.failed, stats.exact_matches
    );
    match stats.mean {
        Some(mean) => {
            let _ = writeln!(md, "**Mean score:** {mean:.2}\n");
        }
        None => md.push_str("**Mean score:** n/a\n\n"),
    }

    md.push_str("## Distribution\n\n");
    md.push_str("| Score | Count | Share |\n");
    md.push_str("|-------|-------|-------|\n");
    for score in (report.item.scale.min..=report.item.scale.max).rev() {
        let count = stats.distribution.get(&score).copied().unwrap_or(0);
        let share = if stats.scored > 0 {
            count as f64 * 100.0 / stats.scored as f64
        } else {
            0.0
        };
        let _ = writeln!(md, "| {score} | {count} | {share:.1}% |");
    }
    md.push('\n');

    if !stats.rule_hits.is_empty() {
        md.push_str("## Deciding rules\n\n");
        md.push_str("| Rule | Responses |\n");
        md.push_str("|------|-----------|\n");
        for (rule, count) in &stats.rule_hits {
            let _ = writeln!(md, "| {rule} | {count} |");
        }
        md.push('\n');
    }

    let failures: Vec<_> = report
        .results
        .iter()
        .filter_map(|r| match &r.outcome {
            ResponseOutcome::Failed { error, attempts } => Some((r, error, attempts)),
            ResponseOutcome::Scored(_) => None,
        })
        .collect();
    if !failures.is_empty() {
        md.push_str("## Failed responses\n\n");
        md.push_str("| Response | Attempts | Error |\n");
        md.push_str("|----------|----------|-------|\n");
        for (r, error, attempts) in failures {
            let _ = writeln!(
                md,
                "| {} | {attempts} | {} |",
                md_cell(&r.response_id),
                md_cell(error)
            );
        }
        md.push('\n');
    }

    let _ = writeln!(md, "_Duration: {}ms_", report.duration_ms);
    md
}

/// Write the markdown summary to `path`.
pub fn write_summary(report: &BatchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_summary(report))
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eiscore_core::model::{Construct, Scale};
    use eiscore_core::report::ItemSummary;
    use eiscore_core::results::{ResponseResult, ScoreResult};
    use eiscore_core::statistics::compute_score_stats;

    fn make_report() -> BatchReport {
        let results = vec![
            ResponseResult {
                row: 0,
                response_id: "p01".into(),
                response: "Everyone loves to read.".into(),
                outcome: ResponseOutcome::Scored(ScoreResult {
                    score: 1,
                    scale: Scale::new(0, 2),
                    rule: "marked-target".into(),
                    trace: vec![],
                }),
            },
            ResponseResult {
                row: 1,
                response_id: "p|02".into(),
                response: "Everyone love".into(),
                outcome: ResponseOutcome::Failed {
                    error: "annotator unavailable: connection refused".into(),
                    attempts: 4,
                },
            },
        ];
        BatchReport {
            id: uuid::Uuid::nil(),
            created_at: Utc::now(),
            item: ItemSummary {
                id: "3sg-love".into(),
                construct: Construct::ThirdPersonSingular,
                scale: Scale::new(0, 2),
                target: "Everyone loves to read comic books as a child.".into(),
            },
            stats: compute_score_stats(&results),
            results,
            duration_ms: 12,
        }
    }

    #[test]
    fn summary_sections() {
        let md = generate_summary(&make_report());
        assert!(md.contains("# eiscore summary: 3sg-love"));
        assert!(md.contains("**Construct:** third-person-singular"));
        assert!(md.contains("**Scale:** 0-2"));
        assert!(md.contains("2 total, 1 scored, 1 failed"));
        assert!(md.contains("**Mean score:** 1.00"));
        assert!(md.contains("| 1 | 1 | 100.0% |"));
        assert!(md.contains("| 2 | 0 | 0.0% |"));
        assert!(md.contains("| marked-target | 1 |"));
        assert!(md.contains("| p\\|02 | 4 | annotator unavailable"));
    }

    #[test]
    fn write_summary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        write_summary(&make_report(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Distribution"));
    }
}
