//! Tab-separated transcription files.
//!
//! Input is one response per line with an id column and a transcription
//! column. Output repeats every input line in order with the score appended
//! as a final column, so scored files line up with the source spreadsheet.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use eiscore_core::results::{ResponseRecord, ResponseResult};

/// Name of the appended column.
pub const SCORE_HEADER: &str = "score";

/// Where to find the id and transcription in each line.
#[derive(Debug, Clone)]
pub struct TsvOptions {
    pub id_column: usize,
    pub text_column: usize,
    /// Treat the first line as a header.
    pub has_header: bool,
}

impl Default for TsvOptions {
    fn default() -> Self {
        Self {
            id_column: 0,
            text_column: 1,
            has_header: true,
        }
    }
}

/// One data line of the input.
#[derive(Debug, Clone)]
pub struct TsvLine {
    /// The line as read, without its terminator.
    pub raw: String,
    /// The response to score; `None` when the line has no transcription column.
    pub record: Option<ResponseRecord>,
}

/// A parsed input file.
#[derive(Debug, Clone, Default)]
pub struct TsvInput {
    pub header: Option<String>,
    pub lines: Vec<TsvLine>,
}

impl TsvInput {
    /// The scorable responses, in file order.
    pub fn records(&self) -> Vec<ResponseRecord> {
        self.lines.iter().filter_map(|l| l.record.clone()).collect()
    }

    /// Lines without a transcription column.
    pub fn skipped(&self) -> usize {
        self.lines.iter().filter(|l| l.record.is_none()).count()
    }
}

/// Parse TSV content. Never fails: short lines are kept but not scored.
pub fn parse_tsv(content: &str, options: &TsvOptions) -> TsvInput {
    let mut lines = content.lines().map(|l| l.strip_suffix('\r').unwrap_or(l));

    let header = if options.has_header {
        lines.next().map(str::to_string)
    } else {
        None
    };

    let lines = lines
        .enumerate()
        .map(|(row, raw)| {
            let columns: Vec<&str> = raw.split('\t').collect();
            let record = columns.get(options.text_column).map(|text| {
                let response_id = columns
                    .get(options.id_column)
                    .filter(|id| !id.trim().is_empty())
                    .map_or_else(|| format!("row-{}", row + 1), |id| id.trim().to_string());
                ResponseRecord {
                    row,
                    response_id,
                    text: text.trim().to_string(),
                }
            });
            if record.is_none() {
                tracing::warn!(
                    "line {} has no column {}, leaving it unscored",
                    row + 1,
                    options.text_column
                );
            }
            TsvLine {
                raw: raw.to_string(),
                record,
            }
        })
        .collect();

    TsvInput { header, lines }
}

/// Read and parse a TSV file.
pub fn read_tsv(path: &Path, options: &TsvOptions) -> Result<TsvInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input: {}", path.display()))?;
    Ok(parse_tsv(&content, options))
}

/// Render the input with a score column appended. Lines that were not
/// scored, or whose scoring failed, get an empty score cell.
pub fn render_scored_tsv(input: &TsvInput, results: &[ResponseResult]) -> String {
    let scores: HashMap<usize, Option<u8>> = results.iter().map(|r| (r.row, r.score())).collect();
    let mut out = String::new();

    if let Some(header) = &input.header {
        out.push_str(header);
        out.push('\t');
        out.push_str(SCORE_HEADER);
        out.push('\n');
    }

    for (row, line) in input.lines.iter().enumerate() {
        out.push_str(&line.raw);
        out.push('\t');
        match scores.get(&row) {
            Some(Some(score)) => out.push_str(&score.to_string()),
            Some(None) => tracing::warn!("row {} failed to score, leaving score empty", row + 1),
            None => {}
        }
        out.push('\n');
    }

    out
}

/// Write the scored TSV to `path`, creating parent directories.
pub fn write_scored_tsv(path: &Path, input: &TsvInput, results: &[ResponseResult]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_scored_tsv(input, results))
        .with_context(|| format!("failed to write output: {}", path.display()))?;
    Ok(())
}
