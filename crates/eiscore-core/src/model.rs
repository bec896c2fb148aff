//! Core data model types for eiscore.
//!
//! Tokens and tagged sentences are produced per scoring call by an
//! annotator; target specifications, scale descriptors and items are built
//! once and reused across many responses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constructs::CascadeOptions;
use crate::error::{AnnotationError, ConfigurationError};

/// Lemma of the copula, as produced by English lemmatizers.
pub const COPULA_LEMMA: &str = "be";

/// Penn Treebank tags the construct rule sets look at.
pub mod tags {
    /// Past participle (`allowed`, `given`).
    pub const PAST_PARTICIPLE: &str = "VBN";
    /// Third-person-singular present verb (`loves`, `plays`).
    pub const THIRD_SINGULAR_PRESENT: &str = "VBZ";
}

/// A single annotated word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The word as it appears in the response.
    pub surface: String,
    /// Dictionary base form.
    pub lemma: String,
    /// Part-of-speech tag (Penn Treebank tagset).
    pub pos: String,
}

impl Token {
    pub fn new(
        surface: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<String>,
    ) -> Self {
        Self {
            surface: surface.into(),
            lemma: lemma.into(),
            pos: pos.into(),
        }
    }

    /// Whether this token carries exactly the given POS tag.
    pub fn is_tagged(&self, tag: &str) -> bool {
        self.pos == tag
    }
}

/// An ordered, index-aligned sequence of annotated tokens.
///
/// Alignment is guaranteed by construction: each position holds one
/// surface/lemma/tag triple, and [`TaggedSentence::from_parts`] refuses
/// parallel sequences of different lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSentence {
    tokens: Vec<Token>,
}

impl TaggedSentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Zip parallel surface, lemma and tag sequences into a sentence.
    pub fn from_parts(
        surfaces: Vec<String>,
        lemmas: Vec<String>,
        tags: Vec<String>,
    ) -> Result<Self, AnnotationError> {
        if surfaces.len() != lemmas.len() || surfaces.len() != tags.len() {
            return Err(AnnotationError::Misaligned {
                surfaces: surfaces.len(),
                lemmas: lemmas.len(),
                tags: tags.len(),
            });
        }

        let tokens = surfaces
            .into_iter()
            .zip(lemmas)
            .zip(tags)
            .map(|((surface, lemma), pos)| Token {
                surface,
                lemma,
                pos,
            })
            .collect();

        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Whether any token has the given lemma.
    pub fn contains_lemma(&self, lemma: &str) -> bool {
        self.tokens.iter().any(|t| t.lemma == lemma)
    }
}

impl<'a> IntoIterator for &'a TaggedSentence {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// The grammatical constructs eiscore knows how to score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Construct {
    /// `be` + past participle (`should not be allowed`).
    BePassive,
    /// Third-person-singular `-s` on present tense verbs (`loves`).
    ThirdPersonSingular,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::BePassive => write!(f, "be-passive"),
            Construct::ThirdPersonSingular => write!(f, "third-person-singular"),
        }
    }
}

impl FromStr for Construct {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "be-passive" | "be_passive" | "passive" => Ok(Construct::BePassive),
            "third-person-singular" | "third_person_singular" | "3sg" => {
                Ok(Construct::ThirdPersonSingular)
            }
            other => Err(ConfigurationError::UnknownConstruct(other.to_string())),
        }
    }
}

/// The fixed per-item configuration a scorer compares responses against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpecification {
    target_sentence: String,
    target_lemma: String,
    target_form: String,
    #[serde(default)]
    secondary_form: Option<String>,
}

impl TargetSpecification {
    /// Build a target specification. The target sentence is stored trimmed.
    pub fn new(
        target_sentence: impl Into<String>,
        target_lemma: impl Into<String>,
        target_form: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let target_sentence = target_sentence.into().trim().to_string();
        let target_lemma = target_lemma.into().trim().to_string();
        let target_form = target_form.into().trim().to_string();

        if target_sentence.is_empty() {
            return Err(ConfigurationError::EmptyTargetSentence);
        }
        if target_lemma.is_empty() {
            return Err(ConfigurationError::EmptyTargetLemma);
        }
        if target_form.is_empty() {
            return Err(ConfigurationError::EmptyTargetForm);
        }

        Ok(Self {
            target_sentence,
            target_lemma,
            target_form,
            secondary_form: None,
        })
    }

    /// Accept a second surface form wherever the target form is checked.
    pub fn with_secondary_form(mut self, form: impl Into<String>) -> Self {
        let form = form.into().trim().to_string();
        self.secondary_form = (!form.is_empty()).then_some(form);
        self
    }

    pub fn target_sentence(&self) -> &str {
        &self.target_sentence
    }

    pub fn target_lemma(&self) -> &str {
        &self.target_lemma
    }

    pub fn target_form(&self) -> &str {
        &self.target_form
    }

    pub fn secondary_form(&self) -> Option<&str> {
        self.secondary_form.as_deref()
    }

    /// Verbatim reproduction of the target, ignoring surrounding whitespace.
    pub fn is_exact_match(&self, response: &str) -> bool {
        response.trim() == self.target_sentence
    }

    /// Whether `surface` is the target form or the secondary form.
    /// Case is ignored so sentence-initial capitals still match.
    pub fn matches_form(&self, surface: &str) -> bool {
        surface.eq_ignore_ascii_case(&self.target_form)
            || self
                .secondary_form
                .as_deref()
                .is_some_and(|f| surface.eq_ignore_ascii_case(f))
    }
}

/// The ordered range of scores a cascade can produce.
///
/// Deserialization rejects `min > max`, so a scale read back from a report
/// is always well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawScale")]
pub struct Scale {
    pub min: u8,
    pub max: u8,
}

#[derive(Deserialize)]
struct RawScale {
    min: u8,
    max: u8,
}

impl TryFrom<RawScale> for Scale {
    type Error = ConfigurationError;

    fn try_from(raw: RawScale) -> Result<Self, Self::Error> {
        Scale::try_new(raw.min, raw.max)
    }
}

impl Scale {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Build a scale, rejecting an inverted range.
    pub fn try_new(min: u8, max: u8) -> Result<Self, ConfigurationError> {
        if min > max {
            return Err(ConfigurationError::InvertedScale { min, max });
        }
        Ok(Self { min, max })
    }

    /// Number of distinct scores, or `None` for an inverted range.
    pub fn levels(&self) -> Option<usize> {
        self.max
            .checked_sub(self.min)
            .map(|span| usize::from(span) + 1)
    }

    pub fn contains(&self, score: u8) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// A requested scale, as written in item banks or on the command line.
///
/// Which concrete [`Scale`] a descriptor resolves to depends on the
/// construct; see [`crate::constructs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScaleDescriptor {
    /// The construct's full multi-tier scale.
    Graded,
    /// Correct / incorrect.
    Binary,
    /// An explicit range such as `0-4`.
    Range { min: u8, max: u8 },
}

impl fmt::Display for ScaleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleDescriptor::Graded => write!(f, "graded"),
            ScaleDescriptor::Binary => write!(f, "binary"),
            ScaleDescriptor::Range { min, max } => write!(f, "{min}-{max}"),
        }
    }
}

impl FromStr for ScaleDescriptor {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "graded" => return Ok(ScaleDescriptor::Graded),
            "binary" => return Ok(ScaleDescriptor::Binary),
            _ => {}
        }

        let malformed = || ConfigurationError::MalformedScale(s.to_string());
        let (min, max) = normalized
            .split_once("..=")
            .or_else(|| normalized.split_once('-'))
            .ok_or_else(malformed)?;
        let min: u8 = min.trim().parse().map_err(|_| malformed())?;
        let max: u8 = max.trim().parse().map_err(|_| malformed())?;
        if min >= max {
            return Err(malformed());
        }

        Ok(ScaleDescriptor::Range { min, max })
    }
}

impl TryFrom<String> for ScaleDescriptor {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScaleDescriptor> for String {
    fn from(value: ScaleDescriptor) -> Self {
        value.to_string()
    }
}

/// One elicited imitation item: a target sentence and the construct it tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier within its item bank.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// The construct this item tests.
    pub construct: Construct,
    /// The canonical target sentence.
    pub target: String,
    /// Lemma of the targeted verb.
    pub lemma: String,
    /// Expected surface form: the copula form for be-passive items, the
    /// inflected verb for third-person-singular items.
    pub form: String,
    /// An alternative accepted surface form.
    #[serde(default)]
    pub secondary_form: Option<String>,
    /// Scale used when scoring this item.
    pub scale: ScaleDescriptor,
    /// Cascade tuning.
    #[serde(default)]
    pub options: CascadeOptions,
}

impl Item {
    /// Build the immutable target specification for this item.
    pub fn target_spec(&self) -> Result<TargetSpecification, ConfigurationError> {
        let spec = TargetSpecification::new(&self.target, &self.lemma, &self.form)?;
        Ok(match &self.secondary_form {
            Some(form) => spec.with_secondary_form(form),
            None => spec,
        })
    }
}

/// A collection of items, loaded from one TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemBank {
    /// Unique identifier for this item bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this item bank.
    #[serde(default)]
    pub description: String,
    /// Scale for items that don't specify one.
    pub default_scale: ScaleDescriptor,
    /// The items in this bank.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl ItemBank {
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }
}
