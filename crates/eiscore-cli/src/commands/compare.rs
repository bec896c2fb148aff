//! The `eiscore compare` command.

use std::path::PathBuf;

use anyhow::Result;

use eiscore_core::report::BatchReport;

fn show(score: Option<u8>) -> String {
    score.map_or_else(|| "failed".to_string(), |s| s.to_string())
}

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    format: String,
    fail_on_change: bool,
) -> Result<()> {
    let baseline = BatchReport::load_json(&baseline_path)?;
    let current = BatchReport::load_json(&current_path)?;

    if baseline.item.id != current.item.id {
        eprintln!(
            "Warning: comparing reports for different items ('{}' vs '{}')",
            baseline.item.id, current.item.id
        );
    }

    let comparison = current.compare(&baseline);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", comparison.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        _ => {
            println!(
                "Comparison: {} changed, {} unchanged",
                comparison.changed.len(),
                comparison.unchanged
            );

            let agreement = &comparison.agreement;
            println!(
                "Agreement over {} pair(s): {:.1}% exact, {:.1}% adjacent, QWK {}",
                agreement.pairs,
                agreement.exact * 100.0,
                agreement.adjacent * 100.0,
                agreement
                    .quadratic_kappa
                    .map_or_else(|| "n/a".to_string(), |k| format!("{k:.3}"))
            );

            if !comparison.changed.is_empty() {
                println!("\nChanged:");
                for c in &comparison.changed {
                    println!(
                        "  {} {} -> {} ({})",
                        c.response_id,
                        show(c.baseline_score),
                        show(c.current_score),
                        c.current_rule.as_deref().unwrap_or("-")
                    );
                }
            }

            if comparison.new_responses > 0 {
                println!("\n{} new response(s)", comparison.new_responses);
            }
            if comparison.removed_responses > 0 {
                println!("{} removed response(s)", comparison.removed_responses);
            }
        }
    }

    if fail_on_change && comparison.has_changes() {
        std::process::exit(1);
    }

    Ok(())
}
