//! The `eiscore score` command.

use std::path::PathBuf;

use anyhow::Result;

use eiscore_annotators::{create_annotator, load_config_from};
use eiscore_core::engine::score_once;
use eiscore_core::parser::{find_item, load_item_banks};
use eiscore_core::Scorer;

pub async fn execute(
    items_path: PathBuf,
    item_id: String,
    response: String,
    explain: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let banks = load_item_banks(&items_path)?;
    let item = find_item(&banks, &item_id)?;

    let annotator = create_annotator(&config.annotator)?;
    tracing::debug!(item = %item.id, annotator = annotator.name(), "scoring single response");
    let scorer = Scorer::for_item(item, annotator)?;

    let result = score_once(&scorer, &response, &config.batch_config()).await?;

    println!(
        "score: {} (scale {}, rule {})",
        result.score, result.scale, result.rule
    );

    if explain {
        for step in &result.trace {
            let mark = if step.matched { "x" } else { " " };
            match &step.detail {
                Some(detail) => println!("  [{mark}] {}: {detail}", step.rule),
                None => println!("  [{mark}] {}", step.rule),
            }
        }
    }

    Ok(())
}
