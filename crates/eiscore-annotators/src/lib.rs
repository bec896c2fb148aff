//! eiscore-annotators — annotation collaborators.
//!
//! Implements the `Annotator` trait for a Stanford CoreNLP server and for an
//! offline lexicon, and builds the configured one from `eiscore.toml`.

pub mod config;
pub mod corenlp;
pub mod lexicon;
pub mod mock;

pub use config::{create_annotator, load_config, load_config_from, AnnotatorConfig, EiscoreConfig};
pub use corenlp::CoreNlpAnnotator;
pub use lexicon::LexiconAnnotator;
pub use mock::MockAnnotator;
