//! Offline lexicon annotator.
//!
//! Tags text from a word list instead of a tagging service. Useful for
//! scoring without a CoreNLP server, and for reproducible tests. Coverage is
//! only as good as the lexicon: every unknown word becomes a noun.
//!
//! Lexicon files map lowercase words to a lemma and Penn tag:
//!
//! ```toml
//! [words]
//! allowed = { lemma = "allow", pos = "VBN" }
//! loves = { lemma = "love", pos = "VBZ" }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use eiscore_core::error::AnnotationError;
use eiscore_core::model::{TaggedSentence, Token, COPULA_LEMMA};
use eiscore_core::traits::Annotator;

/// Tag given to words missing from the lexicon.
pub const UNKNOWN_TAG: &str = "NN";

/// Forms of `be` every lexicon knows.
const COPULA_FORMS: &[(&str, &str)] = &[
    ("be", "VB"),
    ("am", "VBP"),
    ("are", "VBP"),
    ("is", "VBZ"),
    ("was", "VBD"),
    ("were", "VBD"),
    ("been", "VBN"),
    ("being", "VBG"),
];

/// A lexicon entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub lemma: String,
    pub pos: String,
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    words: HashMap<String, LexiconEntry>,
}

/// Annotator backed by an in-memory word list.
#[derive(Debug, Clone)]
pub struct LexiconAnnotator {
    words: HashMap<String, LexiconEntry>,
}

impl Default for LexiconAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconAnnotator {
    /// A lexicon holding only the copula forms.
    pub fn new() -> Self {
        let words = COPULA_FORMS
            .iter()
            .map(|(form, pos)| {
                (
                    form.to_string(),
                    LexiconEntry {
                        lemma: COPULA_LEMMA.to_string(),
                        pos: pos.to_string(),
                    },
                )
            })
            .collect();
        Self { words }
    }

    /// Load a TOML lexicon on top of the copula forms.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read lexicon: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse lexicon: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: LexiconFile = toml::from_str(content)?;
        let mut lexicon = Self::new();
        for (word, entry) in file.words {
            lexicon.insert(&word, entry.lemma, entry.pos);
        }
        Ok(lexicon)
    }

    /// Add or replace an entry. Lookups are case-insensitive.
    pub fn insert(&mut self, word: &str, lemma: impl Into<String>, pos: impl Into<String>) {
        self.words.insert(
            word.to_lowercase(),
            LexiconEntry {
                lemma: lemma.into(),
                pos: pos.into(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn tag_word(&self, word: &str) -> Token {
        if let Some(pos) = punctuation_tag(word) {
            return Token::new(word, word, pos);
        }
        let key = word.to_lowercase();
        match self.words.get(&key) {
            Some(entry) => Token::new(word, &entry.lemma, &entry.pos),
            None => Token::new(word, key, UNKNOWN_TAG),
        }
    }

    /// Tag text synchronously.
    pub fn tag(&self, text: &str) -> TaggedSentence {
        TaggedSentence::new(
            text.split_word_bounds()
                .filter(|w| !w.trim().is_empty())
                .map(|w| self.tag_word(w))
                .collect(),
        )
    }
}

fn punctuation_tag(word: &str) -> Option<&'static str> {
    if !word.chars().all(|c| c.is_ascii_punctuation()) {
        return None;
    }
    Some(match word {
        "." | "!" | "?" => ".",
        "," => ",",
        _ => ":",
    })
}

#[async_trait]
impl Annotator for LexiconAnnotator {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn annotate(&self, text: &str) -> Result<TaggedSentence, AnnotationError> {
        Ok(self.tag(text))
    }
}
