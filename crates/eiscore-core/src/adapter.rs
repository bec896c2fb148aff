//! Tagged sentence adapter.
//!
//! The single place where the engine talks to an annotator. Blank input is
//! rejected before the collaborator is called, and an annotator that returns
//! no tokens for non-blank input is treated as a failed annotation.

use tracing::debug;

use crate::error::AnnotationError;
use crate::model::TaggedSentence;
use crate::traits::Annotator;

/// Annotate a response, enforcing the adapter contract.
pub async fn tag_response(
    annotator: &dyn Annotator,
    text: &str,
) -> Result<TaggedSentence, AnnotationError> {
    if text.trim().is_empty() {
        return Err(AnnotationError::EmptyInput);
    }

    let sentence = annotator.annotate(text).await?;
    if sentence.is_empty() {
        return Err(AnnotationError::EmptyInput);
    }

    debug!(
        annotator = annotator.name(),
        tokens = sentence.len(),
        "annotated response"
    );
    Ok(sentence)
}
