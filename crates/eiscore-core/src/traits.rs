//! The annotation collaborator seam.
//!
//! Annotators turn raw response text into a [`TaggedSentence`]. They are
//! implemented by the `eiscore-annotators` crate (CoreNLP over HTTP, an
//! offline lexicon) and by test doubles.

use async_trait::async_trait;

use crate::error::AnnotationError;
use crate::model::TaggedSentence;

/// Trait for English tokenizers/lemmatizers/POS taggers.
///
/// Implementations must return index-aligned tokens; the engine treats a
/// misaligned result as [`AnnotationError::Misaligned`], never as data.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Human-readable annotator name (e.g. "corenlp").
    fn name(&self) -> &str;

    /// Tokenize, lemmatize and tag `text`.
    async fn annotate(&self, text: &str) -> Result<TaggedSentence, AnnotationError>;
}
