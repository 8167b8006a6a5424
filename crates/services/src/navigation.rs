//! The session state machine.
//!
//! `NavigationState` is synchronous: it never loads anything. Callers load a
//! phrase pool first and hand it to the transition, so a failed load leaves
//! the state untouched.

use std::fmt;

use phrase_core::model::{
    Deck, DirectionMode, PhraseRecord, UnitCatalog, UnitId, UnitSelector, UnitStep,
};
use phrase_core::{Route, build_deck};
use storage::{LoadFailure, UnitPhrases};

use crate::error::NavigationError;

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenKind {
    UnitPicker,
    UnitListing,
    Flashcards,
    Settings,
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenKind::UnitPicker => "unit picker",
            ScreenKind::UnitListing => "unit listing",
            ScreenKind::Flashcards => "flashcard",
            ScreenKind::Settings => "settings",
        };
        f.write_str(name)
    }
}

/// Active study state. The deck is non-empty and `cursor < deck.len()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashcardState {
    deck: Deck,
    pool: UnitPhrases,
    direction: DirectionMode,
    cursor: usize,
    answer_shown: bool,
}

impl FlashcardState {
    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[must_use]
    pub fn selector(&self) -> UnitSelector {
        self.deck.selector()
    }

    #[must_use]
    pub fn direction(&self) -> DirectionMode {
        self.direction
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn answer_shown(&self) -> bool {
        self.answer_shown
    }

    #[must_use]
    pub fn current(&self) -> Option<&PhraseRecord> {
        self.deck.get(self.cursor)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.deck.len()
    }

    fn rebuild(&mut self, shuffle: bool) {
        self.deck = Deck::new(self.deck.selector(), build_deck(&self.pool, shuffle), shuffle);
        self.cursor = 0;
        self.answer_shown = false;
    }

    fn move_to(&mut self, cursor: usize) {
        self.cursor = cursor;
        self.answer_shown = false;
    }
}

/// Exactly one screen is active at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionView {
    UnitPicker,
    UnitListing {
        unit: UnitId,
        show_prompt: bool,
        show_answer: bool,
    },
    Flashcards(FlashcardState),
    /// Settings keeps the screen it was opened from so closing it returns
    /// there untouched.
    Settings { previous: Box<SessionView> },
}

impl SessionView {
    #[must_use]
    pub fn kind(&self) -> ScreenKind {
        match self {
            SessionView::UnitPicker => ScreenKind::UnitPicker,
            SessionView::UnitListing { .. } => ScreenKind::UnitListing,
            SessionView::Flashcards(_) => ScreenKind::Flashcards,
            SessionView::Settings { .. } => ScreenKind::Settings,
        }
    }
}

/// Advisory text shown on the picker; never blocks the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    LoadFailed { unit: UnitId, message: String },
    EmptyUnit(UnitSelector),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LoadFailed { unit, message } => {
                write!(f, "Could not load unit {unit}: {message}")
            }
            Notice::EmptyUnit(selector) => write!(f, "{selector} has no phrases yet"),
        }
    }
}

/// What a manual advance did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The answer of the current card is now visible.
    Revealed,
    /// The cursor moved to the next card.
    Moved,
    /// The last card was done; back on the picker.
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ListingToggles {
    show_prompt: bool,
    show_answer: bool,
}

impl Default for ListingToggles {
    fn default() -> Self {
        Self {
            show_prompt: true,
            show_answer: true,
        }
    }
}

//
// ─── STATE MACHINE ─────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationState {
    view: SessionView,
    shuffle: bool,
    listing: ListingToggles,
    loading: Option<UnitSelector>,
    notice: Option<Notice>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            view: SessionView::UnitPicker,
            shuffle: false,
            listing: ListingToggles::default(),
            loading: None,
            notice: None,
        }
    }

    #[must_use]
    pub fn view(&self) -> &SessionView {
        &self.view
    }

    #[must_use]
    pub fn kind(&self) -> ScreenKind {
        self.view.kind()
    }

    #[must_use]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// The selector whose pool is being loaded, for the loading indicator.
    #[must_use]
    pub fn loading(&self) -> Option<UnitSelector> {
        self.loading
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    #[must_use]
    pub fn flashcards(&self) -> Option<&FlashcardState> {
        match &self.view {
            SessionView::Flashcards(state) => Some(state),
            _ => None,
        }
    }

    #[must_use]
    pub fn listing_unit(&self) -> Option<UnitId> {
        match &self.view {
            SessionView::UnitListing { unit, .. } => Some(*unit),
            _ => None,
        }
    }

    // ─── Loading ───────────────────────────────────────────────────────────

    pub fn begin_loading(&mut self, selector: UnitSelector) {
        self.loading = Some(selector);
        self.notice = None;
    }

    pub fn fail_loading(&mut self, failure: &LoadFailure) {
        self.loading = None;
        self.notice = Some(Notice::LoadFailed {
            unit: failure.unit,
            message: failure.cause.to_string(),
        });
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // ─── Flashcards ────────────────────────────────────────────────────────

    /// Start studying `pool`, ordered by the current shuffle flag.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::EmptyDeck` (and stays put) if the pool has
    /// no phrases.
    pub fn enter_session(
        &mut self,
        selector: UnitSelector,
        direction: DirectionMode,
        pool: UnitPhrases,
    ) -> Result<(), NavigationError> {
        self.loading = None;
        if pool.is_empty() {
            self.notice = Some(Notice::EmptyUnit(selector));
            return Err(NavigationError::EmptyDeck(selector));
        }
        let deck = Deck::new(selector, build_deck(&pool, self.shuffle), self.shuffle);
        self.notice = None;
        self.view = SessionView::Flashcards(FlashcardState {
            deck,
            pool,
            direction,
            cursor: 0,
            answer_shown: false,
        });
        Ok(())
    }

    /// Reveal the answer, or move on once it is visible.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` outside a flashcard session.
    pub fn advance(&mut self) -> Result<Advance, NavigationError> {
        let state = self.flashcards_mut("advance")?;
        if !state.answer_shown {
            state.answer_shown = true;
            return Ok(Advance::Revealed);
        }
        if state.cursor + 1 < state.deck.len() {
            let next = state.cursor + 1;
            state.move_to(next);
            return Ok(Advance::Moved);
        }
        self.complete_session();
        Ok(Advance::Completed)
    }

    /// Step back one card. Returns `false` on the first card.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` outside a flashcard session.
    pub fn retreat(&mut self) -> Result<bool, NavigationError> {
        let state = self.flashcards_mut("go back")?;
        if state.cursor == 0 {
            return Ok(false);
        }
        let previous = state.cursor - 1;
        state.move_to(previous);
        Ok(true)
    }

    /// Place the cursor for autoplay. Returns `false` if there is no session
    /// or `index` is outside the deck.
    pub fn show_at(&mut self, index: usize, answer_shown: bool) -> bool {
        let SessionView::Flashcards(state) = &mut self.view else {
            return false;
        };
        if index >= state.deck.len() {
            return false;
        }
        state.cursor = index;
        state.answer_shown = answer_shown;
        true
    }

    /// Finish the session and return to the picker.
    pub fn complete_session(&mut self) {
        self.view = SessionView::UnitPicker;
        self.loading = None;
    }

    /// Flip the global shuffle flag, rebuilding an active deck from its
    /// unshuffled pool. Returns the new flag.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        let shuffle = self.shuffle;
        if let SessionView::Flashcards(state) = &mut self.view {
            state.rebuild(shuffle);
        }
        shuffle
    }

    // ─── Listing ───────────────────────────────────────────────────────────

    /// Browse one unit's contents.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` unless on the picker or
    /// another listing.
    pub fn open_listing(&mut self, unit: UnitId) -> Result<(), NavigationError> {
        self.ensure_listing_allowed()?;
        self.show_listing(unit);
        Ok(())
    }

    /// Whether `open_listing` is valid from the current screen.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` unless on the picker or a
    /// listing.
    pub fn ensure_listing_allowed(&self) -> Result<(), NavigationError> {
        match self.kind() {
            ScreenKind::UnitPicker | ScreenKind::UnitListing => Ok(()),
            from => Err(NavigationError::InvalidTransition {
                from,
                action: "open a unit listing",
            }),
        }
    }

    /// Move the listing to the adjacent unit. Returns the new unit, or `None`
    /// when already at that end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` outside a listing.
    pub fn navigate_unit(
        &mut self,
        step: UnitStep,
        catalog: &UnitCatalog,
    ) -> Result<Option<UnitId>, NavigationError> {
        let target = self.neighbor_unit(step, catalog)?;
        if let Some(target) = target {
            self.show_listing(target);
        }
        Ok(target)
    }

    /// The unit `navigate_unit` would move to, without moving.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidTransition` outside a listing.
    pub fn neighbor_unit(
        &self,
        step: UnitStep,
        catalog: &UnitCatalog,
    ) -> Result<Option<UnitId>, NavigationError> {
        let Some(current) = self.listing_unit() else {
            return Err(NavigationError::InvalidTransition {
                from: self.kind(),
                action: "switch units",
            });
        };
        Ok(catalog.neighbor(current, step))
    }

    /// Flip visibility of the prompt (Japanese) column. Returns the new value.
    pub fn toggle_listing_prompt(&mut self) -> bool {
        self.listing.show_prompt = !self.listing.show_prompt;
        self.sync_listing_toggles();
        self.listing.show_prompt
    }

    /// Flip visibility of the answer (English) column. Returns the new value.
    pub fn toggle_listing_answer(&mut self) -> bool {
        self.listing.show_answer = !self.listing.show_answer;
        self.sync_listing_toggles();
        self.listing.show_answer
    }

    // ─── Picker & settings ────────────────────────────────────────────────

    pub fn return_to_picker(&mut self) {
        self.view = SessionView::UnitPicker;
        self.loading = None;
    }

    pub fn open_settings(&mut self) {
        if matches!(self.view, SessionView::Settings { .. }) {
            return;
        }
        let previous = std::mem::replace(&mut self.view, SessionView::UnitPicker);
        self.view = SessionView::Settings {
            previous: Box::new(previous),
        };
    }

    pub fn close_settings(&mut self) {
        if !matches!(self.view, SessionView::Settings { .. }) {
            return;
        }
        if let SessionView::Settings { previous } =
            std::mem::replace(&mut self.view, SessionView::UnitPicker)
        {
            self.view = *previous;
        }
    }

    // ─── Location projection ──────────────────────────────────────────────

    /// The route mirroring the current state. Settings reports the route of
    /// the screen underneath it.
    #[must_use]
    pub fn snapshot(&self) -> Route {
        self.route_of(&self.view)
    }

    fn route_of(&self, view: &SessionView) -> Route {
        match view {
            SessionView::UnitPicker => Route::Home,
            SessionView::UnitListing {
                unit,
                show_prompt,
                show_answer,
            } => Route::Listing {
                unit: *unit,
                show_en: *show_answer,
                show_ja: *show_prompt,
            },
            SessionView::Flashcards(state) => Route::Flashcards {
                selector: state.selector(),
                direction: state.direction,
                index: state.cursor,
                show: state.answer_shown,
                random: self.shuffle,
            },
            SessionView::Settings { previous } => self.route_of(previous),
        }
    }

    /// Re-enter a flashcard session described by a location.
    ///
    /// If the same deck is already active under the same shuffle flag, only
    /// the cursor moves, so back/forward through a shuffled deck keeps its
    /// order. The cursor is clamped to the deck.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::EmptyDeck` if the pool has no phrases.
    pub fn restore_flashcards(
        &mut self,
        selector: UnitSelector,
        direction: DirectionMode,
        random: bool,
        index: usize,
        show: bool,
        pool: UnitPhrases,
    ) -> Result<(), NavigationError> {
        let same_deck = self.flashcards().is_some_and(|state| {
            state.selector() == selector && state.deck.is_shuffled() == random
        });

        if !same_deck {
            let previous_shuffle = self.shuffle;
            self.shuffle = random;
            if let Err(err) = self.enter_session(selector, direction, pool) {
                self.shuffle = previous_shuffle;
                return Err(err);
            }
        }

        if let SessionView::Flashcards(state) = &mut self.view {
            state.direction = direction;
            state.cursor = state.deck.clamp_index(index);
            state.answer_shown = show;
        }
        Ok(())
    }

    /// Re-enter a listing described by a location.
    pub fn restore_listing(&mut self, unit: UnitId, show_en: bool, show_ja: bool) {
        self.listing = ListingToggles {
            show_prompt: show_ja,
            show_answer: show_en,
        };
        self.show_listing(unit);
    }

    // ─── Internals ─────────────────────────────────────────────────────────

    fn flashcards_mut(&mut self, action: &'static str) -> Result<&mut FlashcardState, NavigationError> {
        let from = self.kind();
        match &mut self.view {
            SessionView::Flashcards(state) => Ok(state),
            _ => Err(NavigationError::InvalidTransition { from, action }),
        }
    }

    fn show_listing(&mut self, unit: UnitId) {
        self.loading = None;
        self.view = SessionView::UnitListing {
            unit,
            show_prompt: self.listing.show_prompt,
            show_answer: self.listing.show_answer,
        };
    }

    fn sync_listing_toggles(&mut self) {
        if let SessionView::UnitListing {
            show_prompt,
            show_answer,
            ..
        } = &mut self.view
        {
            *show_prompt = self.listing.show_prompt;
            *show_answer = self.listing.show_answer;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn unit(n: u32) -> UnitId {
        UnitId::new(n).unwrap()
    }

    fn unit_three() -> UnitPhrases {
        let u = unit(3);
        vec![
            Arc::new(PhraseRecord::new(u, "1", "こんにちは", "Hello")),
            Arc::new(PhraseRecord::new(u, "2", "ありがとう", "Thank you")),
        ]
        .into()
    }

    fn pool_of(len: usize) -> UnitPhrases {
        let u = unit(1);
        (0..len)
            .map(|i| Arc::new(PhraseRecord::new(u, i.to_string(), format!("JA{i}"), format!("EN{i}"))))
            .collect()
    }

    fn in_session() -> NavigationState {
        let mut nav = NavigationState::new();
        nav.enter_session(UnitSelector::Unit(unit(3)), DirectionMode::Normal, unit_three())
            .unwrap();
        nav
    }

    fn shown(nav: &NavigationState) -> (usize, bool, String) {
        let state = nav.flashcards().unwrap();
        let phrase = state.current().unwrap();
        let text = if state.answer_shown() {
            state.direction().answer_of(phrase)
        } else {
            state.direction().prompt_of(phrase)
        };
        (state.cursor(), state.answer_shown(), text.to_owned())
    }

    #[test]
    fn starts_on_the_picker() {
        let nav = NavigationState::new();
        assert_eq!(nav.kind(), ScreenKind::UnitPicker);
        assert_eq!(nav.snapshot(), Route::Home);
    }

    #[test]
    fn walks_a_unit_from_prompt_to_completion() {
        let mut nav = in_session();
        assert_eq!(nav.flashcards().unwrap().deck().len(), 2);
        assert_eq!(shown(&nav), (0, false, "こんにちは".into()));

        assert_eq!(nav.advance().unwrap(), Advance::Revealed);
        assert_eq!(shown(&nav), (0, true, "Hello".into()));

        assert_eq!(nav.advance().unwrap(), Advance::Moved);
        assert_eq!(shown(&nav), (1, false, "ありがとう".into()));

        assert_eq!(nav.advance().unwrap(), Advance::Revealed);
        assert_eq!(shown(&nav), (1, true, "Thank you".into()));

        assert_eq!(nav.advance().unwrap(), Advance::Completed);
        assert_eq!(nav.kind(), ScreenKind::UnitPicker);
    }

    #[test]
    fn cursor_moves_hide_the_answer() {
        let mut nav = NavigationState::new();
        nav.enter_session(UnitSelector::Unit(unit(1)), DirectionMode::Reverse, pool_of(4))
            .unwrap();
        for _ in 0..3 {
            nav.advance().unwrap();
            nav.advance().unwrap();
            assert!(!nav.flashcards().unwrap().answer_shown());
        }
        nav.advance().unwrap();
        assert!(nav.retreat().unwrap());
        let state = nav.flashcards().unwrap();
        assert_eq!(state.cursor(), 2);
        assert!(!state.answer_shown());
    }

    #[test]
    fn retreat_on_first_card_is_a_noop() {
        let mut nav = in_session();
        nav.advance().unwrap();
        assert!(!nav.retreat().unwrap());
        assert!(nav.flashcards().unwrap().answer_shown());
    }

    #[test]
    fn advance_outside_a_session_is_rejected() {
        let mut nav = NavigationState::new();
        let err = nav.advance().unwrap_err();
        assert_eq!(
            err,
            NavigationError::InvalidTransition {
                from: ScreenKind::UnitPicker,
                action: "advance",
            }
        );
    }

    #[test]
    fn empty_pool_stays_on_the_picker() {
        let mut nav = NavigationState::new();
        nav.begin_loading(UnitSelector::Unit(unit(2)));
        let err = nav
            .enter_session(UnitSelector::Unit(unit(2)), DirectionMode::Normal, pool_of(0))
            .unwrap_err();
        assert_eq!(err, NavigationError::EmptyDeck(UnitSelector::Unit(unit(2))));
        assert_eq!(nav.kind(), ScreenKind::UnitPicker);
        assert_eq!(nav.loading(), None);
        assert_eq!(nav.notice(), Some(&Notice::EmptyUnit(UnitSelector::Unit(unit(2)))));
    }

    #[test]
    fn toggling_shuffle_rebuilds_and_resets() {
        let mut nav = in_session();
        nav.advance().unwrap();
        nav.advance().unwrap();
        nav.advance().unwrap();
        assert_eq!(shown(&nav).0, 1);

        assert!(nav.toggle_shuffle());
        let state = nav.flashcards().unwrap();
        assert_eq!(state.cursor(), 0);
        assert!(!state.answer_shown());
        assert!(state.deck().is_shuffled());
        let mut answers: Vec<&str> = state.deck().phrases().iter().map(|p| p.answer_text()).collect();
        answers.sort_unstable();
        assert_eq!(answers, vec!["Hello", "Thank you"]);

        assert!(!nav.toggle_shuffle());
        let answers: Vec<&str> = nav
            .flashcards()
            .unwrap()
            .deck()
            .phrases()
            .iter()
            .map(|p| p.answer_text())
            .collect();
        assert_eq!(answers, vec!["Hello", "Thank you"]);
    }

    #[test]
    fn shuffle_on_the_picker_applies_to_the_next_session() {
        let mut nav = NavigationState::new();
        nav.toggle_shuffle();
        nav.enter_session(UnitSelector::All, DirectionMode::Normal, pool_of(3))
            .unwrap();
        assert!(nav.flashcards().unwrap().deck().is_shuffled());
        assert!(matches!(nav.snapshot(), Route::Flashcards { random: true, .. }));
    }

    #[test]
    fn listing_navigation_clamps_at_catalog_ends() {
        let catalog = UnitCatalog::numbered(20);
        let mut nav = NavigationState::new();
        nav.open_listing(unit(5)).unwrap();
        assert_eq!(nav.navigate_unit(UnitStep::Next, &catalog).unwrap(), Some(unit(6)));
        assert_eq!(nav.listing_unit(), Some(unit(6)));

        nav.open_listing(unit(20)).unwrap();
        assert_eq!(nav.navigate_unit(UnitStep::Next, &catalog).unwrap(), None);
        assert_eq!(nav.listing_unit(), Some(unit(20)));

        nav.open_listing(unit(1)).unwrap();
        assert_eq!(nav.navigate_unit(UnitStep::Previous, &catalog).unwrap(), None);
    }

    #[test]
    fn listing_toggles_survive_unit_changes() {
        let catalog = UnitCatalog::numbered(3);
        let mut nav = NavigationState::new();
        nav.open_listing(unit(1)).unwrap();
        assert!(!nav.toggle_listing_answer());
        nav.navigate_unit(UnitStep::Next, &catalog).unwrap();
        assert_eq!(
            nav.snapshot(),
            Route::Listing {
                unit: unit(2),
                show_en: false,
                show_ja: true,
            }
        );
    }

    #[test]
    fn listing_cannot_open_from_a_session() {
        let mut nav = in_session();
        assert!(nav.open_listing(unit(1)).is_err());
        assert_eq!(nav.kind(), ScreenKind::Flashcards);
    }

    #[test]
    fn settings_preserve_the_session_underneath() {
        let mut nav = in_session();
        nav.advance().unwrap();
        let before = nav.snapshot();

        nav.open_settings();
        assert_eq!(nav.kind(), ScreenKind::Settings);
        assert_eq!(nav.snapshot(), before);
        nav.open_settings();

        nav.close_settings();
        assert_eq!(nav.kind(), ScreenKind::Flashcards);
        assert_eq!(nav.snapshot(), before);
    }

    #[test]
    fn close_settings_elsewhere_changes_nothing() {
        let mut nav = in_session();
        let before = nav.clone();
        nav.close_settings();
        assert_eq!(nav, before);
    }

    #[test]
    fn restore_clamps_the_cursor() {
        let mut nav = NavigationState::new();
        nav.restore_flashcards(
            UnitSelector::Unit(unit(3)),
            DirectionMode::Normal,
            false,
            9,
            true,
            unit_three(),
        )
        .unwrap();
        assert_eq!(shown(&nav), (1, true, "Thank you".into()));
    }

    #[test]
    fn restore_within_the_same_deck_keeps_its_order() {
        let mut nav = NavigationState::new();
        nav.restore_flashcards(UnitSelector::All, DirectionMode::Normal, true, 0, false, pool_of(30))
            .unwrap();
        let order = nav.flashcards().unwrap().deck().clone();

        nav.restore_flashcards(UnitSelector::All, DirectionMode::Normal, true, 5, false, pool_of(30))
            .unwrap();
        let state = nav.flashcards().unwrap();
        assert_eq!(state.deck(), &order);
        assert_eq!(state.cursor(), 5);
        assert!(nav.shuffle());
    }

    #[test]
    fn failed_load_leaves_the_screen_and_reports() {
        let mut nav = NavigationState::new();
        nav.begin_loading(UnitSelector::Unit(unit(4)));
        nav.fail_loading(&LoadFailure {
            unit: unit(4),
            cause: storage::LoadCause::UnknownUnit,
        });
        assert_eq!(nav.kind(), ScreenKind::UnitPicker);
        assert!(nav.loading().is_none());
        assert!(matches!(nav.notice(), Some(Notice::LoadFailed { .. })));
    }
}
