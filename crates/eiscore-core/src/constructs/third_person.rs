//! Third-person-singular `-s`.
//!
//! | tier | graded | binary | signal |
//! |------|--------|--------|--------|
//! | exact match | 2 | 1 | verbatim target |
//! | `marked-target` | 1 | 1 | the target form, or the target verb tagged VBZ |
//! | `marked-any` | 1 | 1 | any VBZ verb (only with [`MarkingPolicy::AnyVerb`]) |
//! | `unmarked-lemma` | 1 | - | the target verb present but unmarked |
//! | floor | 0 | 0 | |

use crate::constructs::{CascadeOptions, MarkingPolicy, TieredBuilder, Variant};
use crate::error::ConfigurationError;
use crate::model::{tags, Construct, ScaleDescriptor, TaggedSentence};
use crate::rubric::{RuleCascade, RuleContext};

/// Top of the graded scale.
pub const GRADED_MAX: u8 = 2;

pub fn cascade(
    scale: ScaleDescriptor,
    options: &CascadeOptions,
) -> Result<RuleCascade, ConfigurationError> {
    let (variant, scale) = Variant::resolve(Construct::ThirdPersonSingular, scale, GRADED_MAX)?;

    let mut builder = TieredBuilder::new(Construct::ThirdPersonSingular, variant, scale)
        .tier("marked-target", 1, 1, marked_target);
    if options.marking == MarkingPolicy::AnyVerb {
        builder = builder.tier("marked-any", 1, 1, |ctx| marked_any(ctx.sentence));
    }
    builder
        .tier("unmarked-lemma", 1, 0, unmarked_lemma)
        .build()
}

/// A token in the target form, or the target verb tagged VBZ.
pub fn marked_target(ctx: &RuleContext<'_>) -> Option<String> {
    let lemma = ctx.target.target_lemma();
    ctx.sentence.iter().enumerate().find_map(|(i, t)| {
        if ctx.target.matches_form(&t.surface) {
            Some(format!("target form '{}' at {i}", t.surface))
        } else if t.lemma == lemma && t.is_tagged(tags::THIRD_SINGULAR_PRESENT) {
            Some(format!("target verb marked as '{}' at {i}", t.surface))
        } else {
            None
        }
    })
}

/// Any verb tagged third-person-singular present.
pub fn marked_any(sentence: &TaggedSentence) -> Option<String> {
    sentence
        .iter()
        .enumerate()
        .find(|(_, t)| t.is_tagged(tags::THIRD_SINGULAR_PRESENT))
        .map(|(i, t)| format!("marked verb '{}' at {i}", t.surface))
}

/// The target verb present in some other form.
pub fn unmarked_lemma(ctx: &RuleContext<'_>) -> Option<String> {
    let lemma = ctx.target.target_lemma();
    ctx.sentence
        .iter()
        .enumerate()
        .find(|(_, t)| t.lemma == lemma)
        .map(|(i, t)| format!("target lemma '{lemma}' as '{}' ({}) at {i}", t.surface, t.pos))
}
