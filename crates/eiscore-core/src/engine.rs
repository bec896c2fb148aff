//! Batch scoring orchestrator.
//!
//! Scores many responses to one item with bounded parallelism. Transient
//! annotator failures are retried with exponential backoff; every other
//! failure is recorded against its response and the batch carries on.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::error::AnnotationError;
use crate::model::Item;
use crate::report::{BatchReport, ItemSummary};
use crate::results::{ResponseOutcome, ResponseRecord, ResponseResult, ScoreResult};
use crate::scorer::Scorer;
use crate::statistics::compute_score_stats;

/// Upper bound on the backoff between retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Configuration for the batch engine.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum concurrent scoring calls.
    pub parallelism: usize,
    /// Retries on transient annotator errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub retry_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_response_scored(&self, result: &ResponseResult);
    fn on_response_error(&self, response_id: &str, error: &str);
    fn on_batch_complete(&self, total: usize, scored: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_response_scored(&self, _: &ResponseResult) {}
    fn on_response_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// The batch engine.
pub struct BatchEngine {
    config: BatchConfig,
}

impl BatchEngine {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Score every response against `item` and collect a report. Results
    /// are returned in row order regardless of completion order.
    pub async fn run(
        &self,
        item: &Item,
        scorer: Arc<Scorer>,
        responses: Vec<ResponseRecord>,
        progress: &dyn ProgressReporter,
    ) -> Result<BatchReport> {
        anyhow::ensure!(self.config.parallelism >= 1, "parallelism must be at least 1");

        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));
        let total = responses.len();

        tracing::info!(
            item = %item.id,
            responses = total,
            parallelism = self.config.parallelism,
            "starting batch"
        );

        let mut futures = FuturesUnordered::new();
        for record in responses {
            let scorer = Arc::clone(&scorer);
            let semaphore = Arc::clone(&semaphore);
            let config = self.config.clone();

            futures.push(async move {
                let permit = semaphore.acquire_owned().await;
                let outcome = match permit {
                    Ok(_permit) => score_with_retry(&scorer, &record.text, &config).await,
                    Err(_) => ResponseOutcome::Failed {
                        error: "semaphore closed".into(),
                        attempts: 0,
                    },
                };
                ResponseResult {
                    row: record.row,
                    response_id: record.response_id,
                    response: record.text,
                    outcome,
                }
            });
        }

        let mut results = Vec::with_capacity(total);
        let mut scored = 0usize;
        let mut failed = 0usize;

        while let Some(result) = futures.next().await {
            match &result.outcome {
                ResponseOutcome::Scored(_) => {
                    progress.on_response_scored(&result);
                    scored += 1;
                }
                ResponseOutcome::Failed { error, attempts } => {
                    tracing::error!(
                        "scoring failed for {} after {attempts} attempt(s): {error}",
                        result.response_id
                    );
                    progress.on_response_error(&result.response_id, error);
                    failed += 1;
                }
            }
            results.push(result);
        }

        results.sort_by_key(|r| r.row);

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, scored, failed, elapsed);

        let stats = compute_score_stats(&results);

        Ok(BatchReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            item: ItemSummary {
                id: item.id.clone(),
                construct: item.construct,
                scale: scorer.cascade().scale(),
                target: item.target.clone(),
            },
            results,
            stats,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

/// Score one response, retrying transient annotation errors.
async fn score_with_retry(scorer: &Scorer, text: &str, config: &BatchConfig) -> ResponseOutcome {
    let mut retry_delay = config.retry_delay;
    let mut last_error: Option<AnnotationError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            tokio::time::sleep(retry_delay).await;
            retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
        }

        match scorer.score(text).await {
            Ok(result) => return ResponseOutcome::Scored(result),
            Err(e) if !e.is_transient() => {
                return ResponseOutcome::Failed {
                    error: e.to_string(),
                    attempts: attempt + 1,
                };
            }
            Err(e) => {
                tracing::warn!("transient annotation error (attempt {}): {e}", attempt + 1);
                last_error = Some(e);
            }
        }
    }

    ResponseOutcome::Failed {
        error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".into()),
        attempts: config.max_retries + 1,
    }
}

/// Score a response without a batch; convenience for single-shot callers
/// that still want retries.
pub async fn score_once(scorer: &Scorer, text: &str, config: &BatchConfig) -> Result<ScoreResult> {
    match score_with_retry(scorer, text, config).await {
        ResponseOutcome::Scored(result) => Ok(result),
        ResponseOutcome::Failed { error, attempts } => {
            anyhow::bail!("scoring failed after {attempts} attempt(s): {error}")
        }
    }
}
