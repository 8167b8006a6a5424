//! Pure helpers that turn a phrase pool into an ordered deck.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{PhraseRecord, UnitSelector};

/// Order `pool` for study using the thread-local RNG.
///
/// With `shuffle == false` the output is the input order exactly.
#[must_use]
pub fn build_deck(pool: &[Arc<PhraseRecord>], shuffle: bool) -> Vec<Arc<PhraseRecord>> {
    build_deck_with(pool, shuffle, &mut rand::rng())
}

/// Same as [`build_deck`] with an explicit random source.
///
/// Shuffling is a Fisher-Yates permutation, so every ordering is equally
/// likely.
#[must_use]
pub fn build_deck_with<R: Rng + ?Sized>(
    pool: &[Arc<PhraseRecord>],
    shuffle: bool,
    rng: &mut R,
) -> Vec<Arc<PhraseRecord>> {
    let mut deck = pool.to_vec();
    if shuffle {
        deck.as_mut_slice().shuffle(rng);
    }
    deck
}

/// Keep the phrases belonging to `selector`, preserving order.
#[must_use]
pub fn filter_by_unit(pool: &[Arc<PhraseRecord>], selector: UnitSelector) -> Vec<Arc<PhraseRecord>> {
    pool.iter()
        .filter(|phrase| selector.contains(phrase.unit_id()))
        .cloned()
        .collect()
}
