//! Construct rule sets.
//!
//! Each construct declares one rule table with a score per scale variant.
//! Building a cascade resolves the requested [`ScaleDescriptor`] against the
//! construct's supported scales and drops rules that would only award the
//! floor, so the binary variant is the graded one with fewer tiers.

pub mod be_passive;
pub mod third_person;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::model::{Construct, Scale, ScaleDescriptor};
use crate::rubric::{RuleCascade, RuleCascadeBuilder, RuleContext};

/// Largest lookahead the be-passive cascade allows.
pub const MAX_LOOKAHEAD: usize = 2;

/// Which verbs count as correctly marked for third-person-singular items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkingPolicy {
    /// Only the target verb, in its target form.
    #[default]
    TargetVerb,
    /// Any verb tagged third-person-singular present.
    AnyVerb,
}

impl fmt::Display for MarkingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkingPolicy::TargetVerb => write!(f, "target-verb"),
            MarkingPolicy::AnyVerb => write!(f, "any-verb"),
        }
    }
}

impl FromStr for MarkingPolicy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "target-verb" | "target" => Ok(MarkingPolicy::TargetVerb),
            "any-verb" | "any" => Ok(MarkingPolicy::AnyVerb),
            other => Err(ConfigurationError::UnknownMarking(other.to_string())),
        }
    }
}

/// Tuning knobs shared by the construct rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeOptions {
    /// Tokens inspected after a copula when looking for a past participle.
    /// Two tolerates one intervening word (`are not allowed`).
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
    /// Marking policy for third-person-singular items.
    #[serde(default)]
    pub marking: MarkingPolicy,
}

fn default_lookahead() -> usize {
    MAX_LOOKAHEAD
}

impl Default for CascadeOptions {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
            marking: MarkingPolicy::default(),
        }
    }
}

impl CascadeOptions {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(1..=MAX_LOOKAHEAD).contains(&self.lookahead) {
            return Err(ConfigurationError::InvalidLookahead {
                got: self.lookahead,
                max: MAX_LOOKAHEAD,
            });
        }
        Ok(())
    }
}

/// The two scale variants every construct offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Variant {
    Graded,
    Binary,
}

impl Variant {
    /// Resolve a descriptor against a construct whose graded scale is
    /// `0..=graded_max`.
    fn resolve(
        construct: Construct,
        descriptor: ScaleDescriptor,
        graded_max: u8,
    ) -> Result<(Self, Scale), ConfigurationError> {
        let variant = match descriptor {
            ScaleDescriptor::Graded => Variant::Graded,
            ScaleDescriptor::Binary => Variant::Binary,
            ScaleDescriptor::Range { min: 0, max } if max == graded_max => Variant::Graded,
            ScaleDescriptor::Range { min: 0, max: 1 } => Variant::Binary,
            ScaleDescriptor::Range { .. } => {
                return Err(ConfigurationError::UnsupportedScale {
                    construct: construct.to_string(),
                    scale: descriptor.to_string(),
                })
            }
        };

        let scale = match variant {
            Variant::Graded => Scale::new(0, graded_max),
            Variant::Binary => Scale::new(0, 1),
        };
        Ok((variant, scale))
    }
}

/// Collects tiered rules for one variant, skipping tiers that collapse onto
/// the floor.
pub(crate) struct TieredBuilder {
    variant: Variant,
    floor: u8,
    inner: RuleCascadeBuilder,
}

impl TieredBuilder {
    fn new(construct: Construct, variant: Variant, scale: Scale) -> Self {
        Self {
            variant,
            floor: scale.min,
            inner: RuleCascade::builder(construct, scale),
        }
    }

    fn tier<F>(mut self, name: &str, graded: u8, binary: u8, predicate: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        let score = match self.variant {
            Variant::Graded => graded,
            Variant::Binary => binary,
        };
        if score > self.floor {
            self.inner = self.inner.rule(name, score, predicate);
        }
        self
    }

    fn build(self) -> Result<RuleCascade, ConfigurationError> {
        self.inner.build()
    }
}

/// Build the cascade for a construct at the requested scale.
pub fn build_cascade(
    construct: Construct,
    scale: ScaleDescriptor,
    options: &CascadeOptions,
) -> Result<RuleCascade, ConfigurationError> {
    options.validate()?;
    match construct {
        Construct::BePassive => be_passive::cascade(scale, options),
        Construct::ThirdPersonSingular => third_person::cascade(scale, options),
    }
}
