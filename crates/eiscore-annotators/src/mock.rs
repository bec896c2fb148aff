//! Mock annotator for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use eiscore_core::error::AnnotationError;
use eiscore_core::model::TaggedSentence;
use eiscore_core::traits::Annotator;

use crate::lexicon::LexiconAnnotator;

/// A mock annotator for exercising scorers and the batch engine without a
/// tagging service.
///
/// Text containing a registered key fails with that key's error; everything
/// else is tagged by the wrapped lexicon.
pub struct MockAnnotator {
    lexicon: LexiconAnnotator,
    failures: HashMap<String, AnnotationError>,
    call_count: AtomicU32,
    last_text: Mutex<Option<String>>,
}

impl MockAnnotator {
    pub fn new(lexicon: LexiconAnnotator) -> Self {
        Self {
            lexicon,
            failures: HashMap::new(),
            call_count: AtomicU32::new(0),
            last_text: Mutex::new(None),
        }
    }

    /// Fail whenever the text contains `key`.
    pub fn failing_on(mut self, key: &str, error: AnnotationError) -> Self {
        self.failures.insert(key.to_string(), error);
        self
    }

    /// Get the number of calls made to this annotator.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last text passed to this annotator.
    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl Annotator for MockAnnotator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn annotate(&self, text: &str) -> Result<TaggedSentence, AnnotationError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_text.lock() {
            *last = Some(text.to_string());
        }

        if let Some((_, error)) = self.failures.iter().find(|(key, _)| text.contains(key.as_str())) {
            return Err(error.clone());
        }
        Ok(self.lexicon.tag(text))
    }
}
