//! Error types for annotation and scorer configuration.
//!
//! `AnnotationError` covers everything that can go wrong while turning a
//! response into a tagged sentence. It is defined here rather than in the
//! annotator crate so the batch engine can classify errors for retry
//! decisions without string matching.

use thiserror::Error;

/// Errors raised while annotating a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    /// The response was empty or whitespace only.
    #[error("cannot annotate an empty response")]
    EmptyInput,

    /// The surface, lemma and POS sequences disagree in length.
    #[error("annotation misaligned: {surfaces} tokens, {lemmas} lemmas, {tags} POS tags")]
    Misaligned {
        surfaces: usize,
        lemmas: usize,
        tags: usize,
    },

    /// The annotation service answered with an error status.
    #[error("annotation service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    /// The annotation request timed out.
    #[error("annotation request timed out after {0}s")]
    Timeout(u64),

    /// The annotation service could not be reached.
    #[error("annotator unavailable: {0}")]
    Unavailable(String),

    /// The annotation service answered with something we could not read.
    #[error("malformed annotation response: {0}")]
    MalformedResponse(String),
}

impl AnnotationError {
    /// Returns `true` if retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AnnotationError::Timeout(_) | AnnotationError::Unavailable(_) => true,
            AnnotationError::Service { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors raised while building a scorer. These always surface at
/// construction time, before any response is scored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("target sentence must not be empty")]
    EmptyTargetSentence,

    #[error("target lemma must not be empty")]
    EmptyTargetLemma,

    #[error("target form must not be empty")]
    EmptyTargetForm,

    #[error("malformed scale descriptor: '{0}'")]
    MalformedScale(String),

    #[error("inverted scale {min}-{max}: minimum exceeds maximum")]
    InvertedScale { min: u8, max: u8 },

    #[error("{construct} does not support scale {scale}")]
    UnsupportedScale { construct: String, scale: String },

    #[error("rule '{rule}' scores {score}, outside scale {min}-{max}")]
    RuleScoreOutOfRange {
        rule: String,
        score: u8,
        min: u8,
        max: u8,
    },

    #[error("lookahead must be between 1 and {max}, got {got}")]
    InvalidLookahead { got: usize, max: usize },

    #[error("unknown construct: '{0}'")]
    UnknownConstruct(String),

    #[error("unknown marking policy: '{0}'")]
    UnknownMarking(String),
}
