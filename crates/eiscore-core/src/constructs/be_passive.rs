//! Be-passive: `be` + past participle.
//!
//! | tier | graded | binary | signal |
//! |------|--------|--------|--------|
//! | exact match | 4 | 1 | verbatim target |
//! | `copula-participle` | 3 | 1 | a `be` followed within the lookahead by any past participle |
//! | `bare-participle` | 2 | - | the target verb as a participle without the target copula form, or `be` + the target verb unmarked |
//! | `lemma-present` | 1 | - | the target verb in any form |
//! | floor | 0 | 0 | |

use crate::constructs::{CascadeOptions, TieredBuilder, Variant};
use crate::error::ConfigurationError;
use crate::model::{tags, Construct, ScaleDescriptor, TaggedSentence, COPULA_LEMMA};
use crate::rubric::{RuleCascade, RuleContext};

/// Top of the graded scale.
pub const GRADED_MAX: u8 = 4;

pub fn cascade(
    scale: ScaleDescriptor,
    options: &CascadeOptions,
) -> Result<RuleCascade, ConfigurationError> {
    let (variant, scale) = Variant::resolve(Construct::BePassive, scale, GRADED_MAX)?;
    let lookahead = options.lookahead;

    TieredBuilder::new(Construct::BePassive, variant, scale)
        .tier("copula-participle", 3, 1, move |ctx| {
            copula_participle(ctx.sentence, lookahead)
        })
        .tier("bare-participle", 2, 0, bare_participle)
        .tier("lemma-present", 1, 0, lemma_present)
        .build()
}

/// Find a `be` whose next `lookahead` tokens include a past participle.
/// The window is clamped at the end of the sentence.
pub fn copula_participle(sentence: &TaggedSentence, lookahead: usize) -> Option<String> {
    let tokens = sentence.tokens();
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.lemma == COPULA_LEMMA)
        .find_map(|(i, copula)| {
            tokens[i + 1..]
                .iter()
                .take(lookahead)
                .position(|t| t.is_tagged(tags::PAST_PARTICIPLE))
                .map(|offset| {
                    let j = i + 1 + offset;
                    format!(
                        "copula '{}' at {i}, past participle '{}' at {j}",
                        copula.surface, tokens[j].surface
                    )
                })
        })
}

/// The target verb as a past participle that is sentence-initial or not
/// preceded by the target copula form; or the target verb unmarked right
/// after a `be`.
pub fn bare_participle(ctx: &RuleContext<'_>) -> Option<String> {
    let lemma = ctx.target.target_lemma();
    let tokens = ctx.sentence.tokens();

    for (i, token) in tokens.iter().enumerate() {
        if token.lemma != lemma {
            continue;
        }
        let prev = i.checked_sub(1).map(|p| &tokens[p]);

        if token.is_tagged(tags::PAST_PARTICIPLE) {
            match prev {
                None => {
                    return Some(format!(
                        "participle '{}' opens the response",
                        token.surface
                    ))
                }
                Some(p) if !ctx.target.matches_form(&p.surface) => {
                    return Some(format!(
                        "participle '{}' at {i} preceded by '{}', not '{}'",
                        token.surface,
                        p.surface,
                        ctx.target.target_form()
                    ))
                }
                Some(_) => {}
            }
        } else if let Some(p) = prev.filter(|p| p.lemma == COPULA_LEMMA) {
            return Some(format!(
                "copula '{}' followed by unmarked '{}' ({}) at {i}",
                p.surface, token.surface, token.pos
            ));
        }
    }

    None
}

pub fn lemma_present(ctx: &RuleContext<'_>) -> Option<String> {
    let lemma = ctx.target.target_lemma();
    ctx.sentence
        .iter()
        .position(|t| t.lemma == lemma)
        .map(|i| format!("target lemma '{lemma}' at {i}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TargetSpecification, Token};

    const TARGET: &str = "Children should not be allowed to stay out late with their friends.";

    fn target() -> TargetSpecification {
        TargetSpecification::new(TARGET, "allow", "be").unwrap()
    }

    fn tagged(words: &[(&str, &str, &str)]) -> TaggedSentence {
        TaggedSentence::new(
            words
                .iter()
                .map(|(s, l, p)| Token::new(*s, *l, *p))
                .collect(),
        )
    }

    /// "Children should not <middle...> to stay out late with their friends."
    fn response(middle: &[(&str, &str, &str)]) -> TaggedSentence {
        let mut words = vec![
            ("Children", "child", "NNS"),
            ("should", "should", "MD"),
            ("not", "not", "RB"),
        ];
        words.extend_from_slice(middle);
        words.extend_from_slice(&[
            ("to", "to", "TO"),
            ("stay", "stay", "VB"),
            ("out", "out", "RP"),
            ("late", "late", "RB"),
            ("with", "with", "IN"),
            ("their", "they", "PRP$"),
            ("friends", "friend", "NNS"),
            (".", ".", "."),
        ]);
        tagged(&words)
    }

    fn graded() -> RuleCascade {
        cascade(ScaleDescriptor::Graded, &CascadeOptions::default()).unwrap()
    }

    fn binary() -> RuleCascade {
        cascade(ScaleDescriptor::Binary, &CascadeOptions::default()).unwrap()
    }

    #[test]
    fn graded_tiers() {
        let cascade = graded();
        let t = target();

        assert_eq!(cascade.exact_match(&t, TARGET).map(|r| r.score), Some(4));

        let agreed = response(&[("be", "be", "VB"), ("agreed", "agree", "VBN")]);
        let result = cascade.evaluate(&t, &agreed);
        assert_eq!((result.score, result.rule.as_str()), (3, "copula-participle"));

        let no_copula = response(&[("allowed", "allow", "VBN")]);
        let result = cascade.evaluate(&t, &no_copula);
        assert_eq!((result.score, result.rule.as_str()), (2, "bare-participle"));

        let bare_lemma = response(&[("allow", "allow", "VB")]);
        let result = cascade.evaluate(&t, &bare_lemma);
        assert_eq!((result.score, result.rule.as_str()), (1, "lemma-present"));

        let absent = tagged(&[
            ("Children", "child", "NNS"),
            ("should", "should", "MD"),
            ("stay", "stay", "VB"),
            ("out", "out", "RP"),
            ("late", "late", "RB"),
            (".", ".", "."),
        ]);
        let result = cascade.evaluate(&t, &absent);
        assert_eq!(result.score, 0);
        assert!(result.is_floor());
    }

    #[test]
    fn binary_collapses_lower_tiers() {
        let cascade = binary();
        let t = target();

        assert_eq!(cascade.max_score(), 1);
        assert_eq!(cascade.rules().len(), 1);
        assert_eq!(cascade.exact_match(&t, TARGET).map(|r| r.score), Some(1));

        let agreed = response(&[("be", "be", "VB"), ("agreed", "agree", "VBN")]);
        assert_eq!(cascade.evaluate(&t, &agreed).score, 1);

        let no_copula = response(&[("allowed", "allow", "VBN")]);
        assert_eq!(cascade.evaluate(&t, &no_copula).score, 0);
    }

    #[test]
    fn copula_as_last_token_does_not_fault() {
        let s = tagged(&[
            ("Children", "child", "NNS"),
            ("should", "should", "MD"),
            ("be", "be", "VB"),
        ]);
        assert_eq!(copula_participle(&s, 2), None);
        assert_eq!(graded().evaluate(&target(), &s).score, 0);

        let only_copula = tagged(&[("be", "be", "VB")]);
        assert_eq!(copula_participle(&only_copula, 1), None);
    }

    #[test]
    fn lookahead_tolerates_one_intervening_word() {
        let s = tagged(&[
            ("Children", "child", "NNS"),
            ("are", "be", "VBP"),
            ("not", "not", "RB"),
            ("allowed", "allow", "VBN"),
            (".", ".", "."),
        ]);
        assert!(copula_participle(&s, 2).is_some());
        assert_eq!(copula_participle(&s, 1), None);

        let wide = graded();
        assert_eq!(wide.evaluate(&target(), &s).score, 3);

        let narrow = cascade(
            ScaleDescriptor::Graded,
            &CascadeOptions {
                lookahead: 1,
                ..Default::default()
            },
        )
        .unwrap();
        // falls through to the bare participle tier: preceded by "not"
        assert_eq!(narrow.evaluate(&target(), &s).score, 2);
    }

    #[test]
    fn participle_after_target_form_is_not_bare() {
        // "be" tagged as a noun by a confused tagger: the copula rule misses,
        // and the participle is preceded by the target form
        let s = tagged(&[("be", "bee", "NN"), ("allowed", "allow", "VBN")]);
        let t = target();
        let ctx = RuleContext {
            target: &t,
            sentence: &s,
        };
        assert_eq!(bare_participle(&ctx), None);
        assert_eq!(graded().evaluate(&t, &s).score, 1);
    }

    #[test]
    fn participle_opening_response_is_bare() {
        let s = tagged(&[("Allowed", "allow", "VBN"), ("to", "to", "TO")]);
        let t = target();
        let ctx = RuleContext {
            target: &t,
            sentence: &s,
        };
        assert!(bare_participle(&ctx).unwrap().contains("opens"));
    }

    #[test]
    fn copula_with_unmarked_target_verb() {
        let s = response(&[("be", "be", "VB"), ("allow", "allow", "VB")]);
        let result = graded().evaluate(&target(), &s);
        assert_eq!((result.score, result.rule.as_str()), (2, "bare-participle"));
    }

    #[test]
    fn unknown_tags_fall_through() {
        let s = tagged(&[("be", "be", "XX"), ("allowed", "allow", "???")]);
        // neither tag is a participle: copula + unmarked verb
        assert_eq!(graded().evaluate(&target(), &s).score, 2);
    }

    #[test]
    fn unsupported_scale_is_rejected() {
        let err = cascade(
            ScaleDescriptor::Range { min: 0, max: 2 },
            &CascadeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnsupportedScale { .. }));
    }
}
