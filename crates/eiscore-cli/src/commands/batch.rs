//! The `eiscore batch` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use eiscore_annotators::{create_annotator, load_config_from};
use eiscore_core::engine::{BatchEngine, ProgressReporter};
use eiscore_core::parser::{find_item, load_item_banks};
use eiscore_core::report::BatchReport;
use eiscore_core::results::ResponseResult;
use eiscore_core::Scorer;
use eiscore_report::{read_tsv, write_scored_tsv, write_summary, TsvOptions};

pub struct BatchArgs {
    pub items: PathBuf,
    pub item: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub id_column: usize,
    pub column: usize,
    pub no_header: bool,
    pub report: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub parallelism: Option<usize>,
    pub config: Option<PathBuf>,
}

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_response_scored(&self, result: &ResponseResult) {
        if let Some(score) = result.score_result() {
            eprintln!(
                "  {}: {} ({})",
                result.response_id, score.score, score.rule
            );
        }
    }

    fn on_response_error(&self, response_id: &str, error: &str) {
        eprintln!("  ERROR: {response_id}: {error}");
    }

    fn on_batch_complete(&self, total: usize, scored: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {scored}/{total} scored, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(args: BatchArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let mut batch_config = config.batch_config();
    if let Some(parallelism) = args.parallelism {
        batch_config.parallelism = parallelism;
    }
    anyhow::ensure!(
        batch_config.parallelism >= 1,
        "parallelism must be at least 1"
    );

    let banks = load_item_banks(&args.items)?;
    let item = find_item(&banks, &args.item)?;
    let annotator = create_annotator(&config.annotator)?;
    let scorer = Arc::new(Scorer::for_item(item, annotator)?);

    let options = TsvOptions {
        id_column: args.id_column,
        text_column: args.column,
        has_header: !args.no_header,
    };
    let input = read_tsv(&args.input, &options)?;
    let records = input.records();

    eprintln!(
        "eiscore v{}: scoring {} responses against '{}' ({}, scale {})",
        env!("CARGO_PKG_VERSION"),
        records.len(),
        item.id,
        item.construct,
        scorer.cascade().scale()
    );
    if input.skipped() > 0 {
        eprintln!(
            "Warning: {} line(s) have no column {} and will not be scored",
            input.skipped(),
            args.column
        );
    }
    eprintln!();

    let engine = BatchEngine::new(batch_config);
    let report = engine
        .run(item, scorer, records, &ConsoleReporter)
        .await?;

    print_distribution(&report);

    write_scored_tsv(&args.output, &input, &report.results)?;
    eprintln!("Scores written to: {}", args.output.display());

    let report_path = match args.report {
        Some(path) => path,
        None => {
            let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
            config
                .output_dir
                .join(format!("report-{}-{timestamp}.json", item.id))
        }
    };
    report.save_json(&report_path)?;
    eprintln!("Report saved to: {}", report_path.display());

    if let Some(path) = &args.summary {
        write_summary(&report, path)?;
        eprintln!("Summary: {}", path.display());
    }

    Ok(())
}

fn print_distribution(report: &BatchReport) {
    use comfy_table::{Cell, Table};

    let stats = &report.stats;
    let mut table = Table::new();
    table.set_header(vec!["Score", "Responses", "Share"]);

    for score in (report.item.scale.min..=report.item.scale.max).rev() {
        let count = stats.distribution.get(&score).copied().unwrap_or(0);
        let share = if stats.scored > 0 {
            count as f64 * 100.0 / stats.scored as f64
        } else {
            0.0
        };
        table.add_row(vec![
            Cell::new(score),
            Cell::new(count),
            Cell::new(format!("{share:.1}%")),
        ]);
    }
    if stats.failed > 0 {
        table.add_row(vec![
            Cell::new("failed"),
            Cell::new(stats.failed),
            Cell::new("-"),
        ]);
    }

    eprintln!("\n{table}");
    if let Some(mean) = stats.mean {
        eprintln!("Mean score: {mean:.2}");
    }
}
