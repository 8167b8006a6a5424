use std::sync::Arc;

use crate::model::ids::UnitSelector;
use crate::model::phrase::PhraseRecord;

/// Ordered working set of phrases for one study session.
///
/// A deck is never mutated in place; shuffling or switching units builds a
/// new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    selector: UnitSelector,
    phrases: Arc<[Arc<PhraseRecord>]>,
    shuffled: bool,
}

impl Deck {
    #[must_use]
    pub fn new(selector: UnitSelector, phrases: Vec<Arc<PhraseRecord>>, shuffled: bool) -> Self {
        Self {
            selector,
            phrases: phrases.into(),
            shuffled,
        }
    }

    #[must_use]
    pub fn selector(&self) -> UnitSelector {
        self.selector
    }

    #[must_use]
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    #[must_use]
    pub fn phrases(&self) -> &[Arc<PhraseRecord>] {
        &self.phrases
    }

    /// Cheap handle to the shared phrase list.
    #[must_use]
    pub fn shared_phrases(&self) -> Arc<[Arc<PhraseRecord>]> {
        Arc::clone(&self.phrases)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PhraseRecord> {
        self.phrases.get(index).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Clamp a restored cursor into `[0, len - 1]`.
    #[must_use]
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.len().saturating_sub(1))
    }
}
