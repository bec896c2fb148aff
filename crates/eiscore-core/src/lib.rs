//! eiscore-core — Rule-cascade scoring engine for elicited imitation items.
//!
//! This crate defines the data model, the annotator seam, the ordered rule
//! cascade evaluator and the construct rule sets that the rest of the
//! eiscore system builds on.

pub mod adapter;
pub mod constructs;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod results;
pub mod rubric;
pub mod scorer;
pub mod statistics;
pub mod traits;

pub use error::{AnnotationError, ConfigurationError};
pub use model::{Construct, ScaleDescriptor, TaggedSentence, TargetSpecification, Token};
pub use results::ScoreResult;
pub use rubric::RuleCascade;
pub use scorer::Scorer;
pub use traits::Annotator;
