//! eiscore-report — batch input and output formats.
//!
//! Reads transcriptions from TSV, writes the same TSV back with a score
//! column, and renders batch reports as markdown summaries.

pub mod summary;
pub mod tsv;

pub use summary::{generate_summary, write_summary};
pub use tsv::{parse_tsv, read_tsv, render_scored_tsv, write_scored_tsv, TsvInput, TsvOptions};
