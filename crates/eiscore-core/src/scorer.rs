//! A cascade bound to one target and one annotator.

use std::fmt;
use std::sync::Arc;

use tracing::instrument;

use crate::adapter::tag_response;
use crate::constructs::{build_cascade, CascadeOptions};
use crate::error::{AnnotationError, ConfigurationError};
use crate::model::{Construct, Item, ScaleDescriptor, TaggedSentence, TargetSpecification};
use crate::results::ScoreResult;
use crate::rubric::RuleCascade;
use crate::traits::Annotator;

/// Scores responses to one item.
///
/// Holds only immutable state, so a single instance can be shared through an
/// `Arc` and called concurrently.
#[derive(Clone)]
pub struct Scorer {
    target: TargetSpecification,
    cascade: RuleCascade,
    annotator: Arc<dyn Annotator>,
}

impl Scorer {
    /// Build a scorer with default cascade options.
    pub fn new(
        construct: Construct,
        target: TargetSpecification,
        scale: ScaleDescriptor,
        annotator: Arc<dyn Annotator>,
    ) -> Result<Self, ConfigurationError> {
        Self::with_options(construct, target, scale, &CascadeOptions::default(), annotator)
    }

    pub fn with_options(
        construct: Construct,
        target: TargetSpecification,
        scale: ScaleDescriptor,
        options: &CascadeOptions,
        annotator: Arc<dyn Annotator>,
    ) -> Result<Self, ConfigurationError> {
        let cascade = build_cascade(construct, scale, options)?;
        Ok(Self::with_cascade(target, cascade, annotator))
    }

    /// Bind a prebuilt cascade.
    pub fn with_cascade(
        target: TargetSpecification,
        cascade: RuleCascade,
        annotator: Arc<dyn Annotator>,
    ) -> Self {
        Self {
            target,
            cascade,
            annotator,
        }
    }

    /// Build the scorer described by an item-bank entry.
    pub fn for_item(item: &Item, annotator: Arc<dyn Annotator>) -> Result<Self, ConfigurationError> {
        Self::with_options(
            item.construct,
            item.target_spec()?,
            item.scale,
            &item.options,
            annotator,
        )
    }

    pub fn target(&self) -> &TargetSpecification {
        &self.target
    }

    pub fn cascade(&self) -> &RuleCascade {
        &self.cascade
    }

    /// Score one response. Exact reproductions of the target are scored
    /// without calling the annotator.
    #[instrument(skip(self), fields(construct = %self.cascade.construct()))]
    pub async fn score(&self, response: &str) -> Result<ScoreResult, AnnotationError> {
        if let Some(result) = self.cascade.exact_match(&self.target, response) {
            return Ok(result);
        }

        let sentence = tag_response(self.annotator.as_ref(), response).await?;
        Ok(self.cascade.evaluate(&self.target, &sentence))
    }

    /// Score a response that has already been annotated.
    pub fn score_tagged(&self, response: &str, sentence: &TaggedSentence) -> ScoreResult {
        self.cascade
            .exact_match(&self.target, response)
            .unwrap_or_else(|| self.cascade.evaluate(&self.target, sentence))
    }
}

impl fmt::Debug for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scorer")
            .field("target", &self.target)
            .field("cascade", &self.cascade)
            .field("annotator", &self.annotator.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Token;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Looks each whitespace-separated word up in a fixed table.
    struct TableAnnotator {
        words: HashMap<&'static str, (&'static str, &'static str)>,
        calls: AtomicU32,
    }

    impl TableAnnotator {
        fn new(entries: &[(&'static str, &'static str, &'static str)]) -> Self {
            Self {
                words: entries.iter().map(|(s, l, p)| (*s, (*l, *p))).collect(),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Annotator for TableAnnotator {
        fn name(&self) -> &str {
            "table"
        }

        async fn annotate(&self, text: &str) -> Result<TaggedSentence, AnnotationError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let tokens = text
                .trim_end_matches('.')
                .split_whitespace()
                .map(|w| match self.words.get(w) {
                    Some((lemma, pos)) => Token::new(w, *lemma, *pos),
                    None => Token::new(w, w.to_lowercase(), "NN"),
                })
                .collect();
            Ok(TaggedSentence::new(tokens))
        }
    }

    struct MisalignedAnnotator;

    #[async_trait]
    impl Annotator for MisalignedAnnotator {
        fn name(&self) -> &str {
            "misaligned"
        }

        async fn annotate(&self, _text: &str) -> Result<TaggedSentence, AnnotationError> {
            TaggedSentence::from_parts(
                vec!["a".into(), "b".into()],
                vec!["a".into(), "b".into()],
                vec!["DT".into()],
            )
        }
    }

    fn passive_annotator() -> Arc<TableAnnotator> {
        Arc::new(TableAnnotator::new(&[
            ("should", "should", "MD"),
            ("not", "not", "RB"),
            ("be", "be", "VB"),
            ("agreed", "agree", "VBN"),
            ("allowed", "allow", "VBN"),
            ("allow", "allow", "VB"),
            ("stay", "stay", "VB"),
        ]))
    }

    fn passive_scorer(annotator: Arc<dyn Annotator>) -> Scorer {
        Scorer::new(
            Construct::BePassive,
            TargetSpecification::new(
                "Children should not be allowed to stay out late with their friends.",
                "allow",
                "be",
            )
            .unwrap(),
            ScaleDescriptor::Graded,
            annotator,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn be_passive_examples() {
        let scorer = passive_scorer(passive_annotator());
        let cases = [
            ("Children should not be allowed to stay out late with their friends.", 4),
            ("Children should not be agreed to stay out late with their friends.", 3),
            ("Children should not allowed to stay out late with their friends.", 2),
            ("Children should not allow to stay out late with their friends.", 1),
            ("Children should stay out late with their friends.", 0),
        ];
        for (response, expected) in cases {
            let result = scorer.score(response).await.unwrap();
            assert_eq!(result.score, expected, "response: {response}");
        }
    }

    #[tokio::test]
    async fn exact_match_skips_annotation() {
        let annotator = passive_annotator();
        let scorer = passive_scorer(annotator.clone());
        let result = scorer
            .score("  Children should not be allowed to stay out late with their friends.\n")
            .await
            .unwrap();
        assert_eq!(result.score, 4);
        assert_eq!(annotator.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn scoring_is_idempotent() {
        let scorer = passive_scorer(passive_annotator());
        let response = "Children should not allowed to stay out late with their friends.";
        let first = scorer.score(response).await.unwrap();
        let second = scorer.score(response).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn misaligned_annotation_is_an_error() {
        let scorer = passive_scorer(Arc::new(MisalignedAnnotator));
        let err = scorer.score("anything else").await.unwrap_err();
        assert!(matches!(err, AnnotationError::Misaligned { .. }));
    }

    #[tokio::test]
    async fn empty_response_is_an_error() {
        let scorer = passive_scorer(passive_annotator());
        assert_eq!(
            scorer.score("   ").await.unwrap_err(),
            AnnotationError::EmptyInput
        );
    }

    #[tokio::test]
    async fn third_person_examples() {
        let annotator: Arc<dyn Annotator> = Arc::new(TableAnnotator::new(&[
            ("loves", "love", "VBZ"),
            ("love", "love", "VBP"),
            ("likes", "like", "VBZ"),
            ("read", "read", "VB"),
        ]));
        let target =
            TargetSpecification::new("Everyone loves to read comic books as a child.", "love", "loves")
                .unwrap();
        let graded = Scorer::new(
            Construct::ThirdPersonSingular,
            target.clone(),
            ScaleDescriptor::Graded,
            annotator.clone(),
        )
        .unwrap();
        let binary = Scorer::new(
            Construct::ThirdPersonSingular,
            target,
            ScaleDescriptor::Binary,
            annotator,
        )
        .unwrap();

        let exact = "Everyone loves to read comic books as a child.";
        let unmarked = "Everyone love to read comic books as a child.";
        let other_verb = "Everyone likes to read comic books.";

        assert_eq!(graded.score(exact).await.unwrap().score, 2);
        assert_eq!(graded.score(unmarked).await.unwrap().score, 1);
        assert_eq!(graded.score(other_verb).await.unwrap().score, 0);

        assert_eq!(binary.score(exact).await.unwrap().score, 1);
        assert_eq!(binary.score(unmarked).await.unwrap().score, 0);
        assert_eq!(binary.score(other_verb).await.unwrap().score, 0);
    }

    #[tokio::test]
    async fn shared_scorer_across_tasks() {
        let scorer = Arc::new(passive_scorer(passive_annotator()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let scorer = Arc::clone(&scorer);
                tokio::spawn(async move {
                    scorer
                        .score("Children should not allow to stay out late with their friends.")
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().score, 1);
        }
    }

    #[test]
    fn empty_lemma_fails_at_construction() {
        let err = TargetSpecification::new("Children are allowed.", "", "be").unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyTargetLemma);
    }

    #[test]
    fn malformed_scale_fails_at_construction() {
        let err = "0-9".parse::<ScaleDescriptor>().and_then(|scale| {
            Scorer::new(
                Construct::BePassive,
                TargetSpecification::new("Children are allowed.", "allow", "are")?,
                scale,
                passive_annotator(),
            )
        });
        assert!(matches!(
            err,
            Err(ConfigurationError::UnsupportedScale { .. })
        ));
    }
}
