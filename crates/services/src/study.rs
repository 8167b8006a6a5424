use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use phrase_core::Route;
use phrase_core::model::{
    DirectionMode, Language, SpeechSettings, SpeechSettingsPatch, UnitId, UnitSelector, UnitStep,
};
use storage::{PhraseSource, UnitPhrases};

use crate::autoplay::{AutoplayEngine, AutoplayEvent, AutoplayEventKind, AutoplayStatus};
use crate::error::{NavigationError, StudyError};
use crate::navigation::{Advance, NavigationState, ScreenKind};
use crate::settings_service::SettingsService;
use crate::speech::{SpeechCapability, Utterance};
use crate::url_sync::{Location, UrlSync};

/// Drives a study session: loads phrases, applies transitions, keeps the
/// location in step and runs autoplay.
///
/// Every operation runs to completion before the next one starts. Autoplay
/// steps arrive on the receiver returned by [`StudyService::new`] and must be
/// fed back through [`StudyService::handle_autoplay_event`]; location changes
/// go through [`StudyService::handle_location_change`].
pub struct StudyService<L: Location> {
    source: PhraseSource,
    settings: SettingsService,
    speech: Arc<dyn SpeechCapability>,
    autoplay: AutoplayEngine,
    nav: NavigationState,
    url: UrlSync,
    location: L,
    listing: Option<UnitPhrases>,
}

impl<L: Location> StudyService<L> {
    #[must_use]
    pub fn new(
        source: PhraseSource,
        settings: SettingsService,
        speech: Arc<dyn SpeechCapability>,
        location: L,
    ) -> (Self, mpsc::UnboundedReceiver<AutoplayEvent>) {
        let (autoplay, events) = AutoplayEngine::new(Arc::clone(&speech), settings.subscribe());
        let service = Self {
            source,
            settings,
            speech,
            autoplay,
            nav: NavigationState::new(),
            url: UrlSync::new(),
            location,
            listing: None,
        };
        (service, events)
    }

    // ─── Inspection ────────────────────────────────────────────────────────

    #[must_use]
    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    #[must_use]
    pub fn source(&self) -> &PhraseSource {
        &self.source
    }

    #[must_use]
    pub fn location(&self) -> &L {
        &self.location
    }

    /// Mutable access for hosts that drive back/forward on the location.
    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    #[must_use]
    pub fn autoplay_status(&self) -> AutoplayStatus {
        self.autoplay.status()
    }

    /// Phrases of the unit on the listing screen.
    #[must_use]
    pub fn listing_phrases(&self) -> Option<&UnitPhrases> {
        match self.nav.kind() {
            ScreenKind::UnitListing => self.listing.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> SpeechSettings {
        self.settings.current()
    }

    #[must_use]
    pub fn speech_available(&self) -> bool {
        self.speech.is_available()
    }

    // ─── Startup ───────────────────────────────────────────────────────────

    /// Apply the location present at startup, then any change that arrived
    /// before it was applied.
    ///
    /// # Errors
    ///
    /// Returns `StudyError` if the initial route could not be restored. The
    /// service is still usable and sits on the picker.
    pub async fn initialize(&mut self) -> Result<(), StudyError> {
        let route = self.url.initial_route(&self.location);
        debug!(fragment = %route.to_fragment(), "restoring initial location");
        let result = self.apply_route(route).await;
        if let Err(err) = &result {
            warn!(error = %err, "initial location could not be restored");
        }

        if let Some(pending) = self.url.mark_ready() {
            if let Err(err) = self.apply_route(pending).await {
                warn!(error = %err, "deferred location could not be restored");
            }
        }
        self.sync();
        result
    }

    // ─── Flashcards ────────────────────────────────────────────────────────

    /// Load `selector` and start a flashcard session over it.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Load` if the phrases cannot be loaded and
    /// `StudyError::Navigation` if the unit is empty or settings are open.
    /// The previous screen stays active in both cases.
    pub async fn select_unit(
        &mut self,
        selector: UnitSelector,
        direction: DirectionMode,
    ) -> Result<(), StudyError> {
        let result = self.enter_unit(selector, direction).await;
        self.sync();
        result
    }

    /// Reveal the answer or move on. Stops autoplay first.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Navigation` outside a flashcard session.
    pub fn advance(&mut self) -> Result<Advance, StudyError> {
        self.halt_autoplay();
        let result = self.nav.advance();
        if matches!(result, Ok(Advance::Revealed)) && self.settings.current().auto_speak() {
            self.speak_answer();
        }
        if matches!(result, Ok(Advance::Completed)) {
            info!("study session complete");
        }
        self.sync();
        Ok(result?)
    }

    /// Step back one card. Stops autoplay first.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Navigation` outside a flashcard session.
    pub fn retreat(&mut self) -> Result<bool, StudyError> {
        self.halt_autoplay();
        let result = self.nav.retreat();
        self.sync();
        Ok(result?)
    }

    /// Flip the shuffle flag. Stops autoplay and reorders an active deck.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.halt_autoplay();
        let shuffle = self.nav.toggle_shuffle();
        debug!(shuffle, "shuffle toggled");
        self.sync();
        shuffle
    }

    // ─── Listing ───────────────────────────────────────────────────────────

    /// Load `unit` and show its full contents.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Navigation` unless on the picker or a listing,
    /// and `StudyError::Load` if the unit cannot be loaded.
    pub async fn open_unit_listing(&mut self, unit: UnitId) -> Result<(), StudyError> {
        let result = self.enter_listing(unit).await;
        self.sync();
        result
    }

    /// Move the listing to the adjacent unit. Returns the new unit, or `None`
    /// at either end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Navigation` outside a listing and
    /// `StudyError::Load` if the target unit cannot be loaded.
    pub async fn navigate_unit(&mut self, step: UnitStep) -> Result<Option<UnitId>, StudyError> {
        let result = self.step_listing(step).await;
        self.sync();
        result
    }

    pub fn toggle_listing_prompt(&mut self) -> bool {
        let shown = self.nav.toggle_listing_prompt();
        self.sync();
        shown
    }

    pub fn toggle_listing_answer(&mut self) -> bool {
        let shown = self.nav.toggle_listing_answer();
        self.sync();
        shown
    }

    // ─── Picker & settings ────────────────────────────────────────────────

    pub fn return_to_picker(&mut self) {
        self.halt_autoplay();
        self.nav.return_to_picker();
        self.listing = None;
        self.sync();
    }

    pub fn open_settings(&mut self) {
        self.halt_autoplay();
        self.nav.open_settings();
        self.sync();
    }

    pub fn close_settings(&mut self) {
        self.nav.close_settings();
        self.sync();
    }

    pub fn dismiss_notice(&mut self) {
        self.nav.dismiss_notice();
    }

    /// # Errors
    ///
    /// Returns `StudyError::Settings` if the settings cannot be saved.
    pub async fn update_settings(
        &mut self,
        patch: SpeechSettingsPatch,
    ) -> Result<SpeechSettings, StudyError> {
        Ok(self.settings.update(patch).await?)
    }

    /// # Errors
    ///
    /// Returns `StudyError::Settings` if the stored settings cannot be cleared.
    pub async fn reset_settings(&mut self) -> Result<SpeechSettings, StudyError> {
        Ok(self.settings.reset().await?)
    }

    // ─── Autoplay ──────────────────────────────────────────────────────────

    /// Play the deck from the current card. Returns `false` if autoplay was
    /// already running.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Navigation` outside a flashcard session.
    pub fn start_autoplay(&mut self) -> Result<bool, StudyError> {
        let Some(state) = self.nav.flashcards() else {
            return Err(NavigationError::InvalidTransition {
                from: self.nav.kind(),
                action: "start autoplay",
            }
            .into());
        };
        if self.autoplay.is_running() {
            return Ok(false);
        }
        let from = state.cursor();
        let started = self.autoplay.start(state.deck(), state.direction(), from);
        if started {
            self.nav.show_at(from, false);
            self.url.resume();
            let entry = self.nav.snapshot();
            self.url.write(&mut self.location, &entry);
            self.url.suspend();
        }
        Ok(started)
    }

    /// Stop autoplay, leaving the cursor where it is. Returns whether it was
    /// running.
    pub fn stop_autoplay(&mut self) -> bool {
        let stopped = self.halt_autoplay();
        self.sync();
        stopped
    }

    /// Jump autoplay to its next step.
    pub fn skip_autoplay(&mut self) -> bool {
        self.autoplay.skip_to_next()
    }

    /// Apply one autoplay step. Stale events are dropped; returns whether the
    /// event was applied.
    pub fn handle_autoplay_event(&mut self, event: AutoplayEvent) -> bool {
        if !self.autoplay.is_live(&event) {
            trace!(generation = event.generation, "dropping stale autoplay event");
            return false;
        }
        match event.kind {
            AutoplayEventKind::Show {
                index,
                answer_shown,
            } => self.nav.show_at(index, answer_shown),
            AutoplayEventKind::Finished => {
                self.url.resume();
                self.nav.complete_session();
                self.listing = None;
                self.sync();
                true
            }
        }
    }

    // ─── Location ──────────────────────────────────────────────────────────

    /// React to a location change delivered by the host. Returns `true` if
    /// the change was external and has been applied.
    ///
    /// # Errors
    ///
    /// Returns `StudyError` if the route could not be restored; the previous
    /// screen stays active.
    pub async fn handle_location_change(&mut self, fragment: &str) -> Result<bool, StudyError> {
        let Some(route) = self.url.on_change(fragment) else {
            return Ok(false);
        };
        debug!(%fragment, "applying external location change");
        let result = self.restore(route).await;
        result.map(|()| true)
    }

    /// Bring the state in line with `route`.
    ///
    /// # Errors
    ///
    /// Returns `StudyError` if the route's phrases cannot be loaded or the
    /// deck would be empty.
    pub async fn restore(&mut self, route: Route) -> Result<(), StudyError> {
        let result = self.apply_route(route).await;
        self.sync();
        result
    }

    // ─── Speech ────────────────────────────────────────────────────────────

    /// Speak the prompt of the current card. Returns `false` without speech
    /// or outside a session.
    pub fn speak_prompt(&self) -> bool {
        let Some(state) = self.nav.flashcards() else {
            return false;
        };
        let Some(phrase) = state.current() else {
            return false;
        };
        let direction = state.direction();
        self.say(direction.prompt_of(phrase), direction.prompt_language())
    }

    /// Speak the answer of the current card.
    pub fn speak_answer(&self) -> bool {
        let Some(state) = self.nav.flashcards() else {
            return false;
        };
        let Some(phrase) = state.current() else {
            return false;
        };
        let direction = state.direction();
        self.say(direction.answer_of(phrase), direction.answer_language())
    }

    /// Speak one side of a listing row.
    pub fn speak_listing_row(&self, row: usize, language: Language) -> bool {
        let Some(phrase) = self.listing_phrases().and_then(|phrases| phrases.get(row)) else {
            return false;
        };
        self.say(phrase.text(language), language)
    }

    // ─── Internals ─────────────────────────────────────────────────────────

    async fn enter_unit(
        &mut self,
        selector: UnitSelector,
        direction: DirectionMode,
    ) -> Result<(), StudyError> {
        if self.nav.kind() == ScreenKind::Settings {
            return Err(NavigationError::InvalidTransition {
                from: ScreenKind::Settings,
                action: "select a unit",
            }
            .into());
        }
        self.halt_autoplay();
        let pool = self.load(selector).await?;
        self.nav.enter_session(selector, direction, pool)?;
        self.listing = None;
        info!(%selector, direction = direction.token(), "study session started");
        Ok(())
    }

    async fn enter_listing(&mut self, unit: UnitId) -> Result<(), StudyError> {
        self.nav.ensure_listing_allowed()?;
        let phrases = self.load(UnitSelector::Unit(unit)).await?;
        self.nav.open_listing(unit)?;
        self.listing = Some(phrases);
        Ok(())
    }

    async fn step_listing(&mut self, step: UnitStep) -> Result<Option<UnitId>, StudyError> {
        let Some(target) = self.nav.neighbor_unit(step, self.source.catalog())? else {
            return Ok(None);
        };
        let phrases = self.load(UnitSelector::Unit(target)).await?;
        let moved = self.nav.navigate_unit(step, self.source.catalog())?;
        self.listing = Some(phrases);
        Ok(moved)
    }

    async fn apply_route(&mut self, route: Route) -> Result<(), StudyError> {
        self.halt_autoplay();
        match route {
            Route::Home => {
                self.nav.return_to_picker();
                self.listing = None;
            }
            Route::Flashcards {
                selector,
                direction,
                index,
                show,
                random,
            } => {
                let pool = self.load(selector).await?;
                self.nav
                    .restore_flashcards(selector, direction, random, index, show, pool)?;
                self.listing = None;
            }
            Route::Listing {
                unit,
                show_en,
                show_ja,
            } => {
                let phrases = self.load(UnitSelector::Unit(unit)).await?;
                self.nav.restore_listing(unit, show_en, show_ja);
                self.listing = Some(phrases);
            }
        }
        Ok(())
    }

    async fn load(&mut self, selector: UnitSelector) -> Result<UnitPhrases, StudyError> {
        self.nav.begin_loading(selector);
        match self.source.load_selector(selector).await {
            Ok(phrases) => Ok(phrases),
            Err(failure) => {
                warn!(%selector, error = %failure, "phrases unavailable");
                self.nav.fail_loading(&failure);
                Err(failure.into())
            }
        }
    }

    /// A run that ended on its own may still have `Finished` queued. Stopping
    /// drops that event, so the location is resumed here either way.
    fn halt_autoplay(&mut self) -> bool {
        let stopped = self.autoplay.stop();
        self.url.resume();
        stopped
    }

    fn say(&self, text: &str, language: Language) -> bool {
        if !self.speech.is_available() {
            return false;
        }
        let utterance = Utterance::new(text, language, &self.settings.current());
        let speech = Arc::clone(&self.speech);
        speech.cancel();
        tokio::spawn(async move {
            if let Err(err) = speech.speak(utterance).await {
                debug!(error = %err, "utterance ended early");
            }
        });
        true
    }

    /// Mirror the state into the location unless autoplay owns it.
    fn sync(&mut self) {
        if self.autoplay.is_running() {
            return;
        }
        let route = self.nav.snapshot();
        self.url.write(&mut self.location, &route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::SilentSpeech;
    use crate::url_sync::MemoryHistory;
    use phrase_core::model::UnitCatalog;
    use storage::{InMemoryFetcher, InMemorySettingsRepository};

    fn unit(n: u32) -> UnitId {
        UnitId::new(n).unwrap()
    }

    fn service(
        fetcher: &InMemoryFetcher,
        fragment: &str,
    ) -> (
        StudyService<MemoryHistory>,
        mpsc::UnboundedReceiver<AutoplayEvent>,
    ) {
        let source = PhraseSource::new(UnitCatalog::numbered(20), Arc::new(fetcher.clone()));
        let settings = SettingsService::with_defaults(Arc::new(InMemorySettingsRepository::new()));
        StudyService::new(
            source,
            settings,
            Arc::new(SilentSpeech),
            MemoryHistory::new(fragment),
        )
    }

    fn fetcher() -> InMemoryFetcher {
        let fetcher = InMemoryFetcher::new();
        fetcher.insert("unit3.csv", "No,EN,JA\n1,Hello,こんにちは\n2,Thank you,ありがとう\n");
        fetcher.insert("unit4.csv", "No,EN,JA\n1,,空\n");
        fetcher
    }

    #[tokio::test]
    async fn select_unit_writes_the_location() {
        let (mut study, _events) = service(&fetcher(), "#/");
        study.initialize().await.unwrap();

        study
            .select_unit(UnitSelector::Unit(unit(3)), DirectionMode::Normal)
            .await
            .unwrap();
        assert_eq!(study.location().fragment(), "#/unit3/ja-en?index=0&show=false");

        study.advance().unwrap();
        assert_eq!(study.location().fragment(), "#/unit3/ja-en?index=0&show=true");
    }

    #[tokio::test]
    async fn failed_load_keeps_the_picker() {
        let (mut study, _events) = service(&fetcher(), "#/");
        study.initialize().await.unwrap();

        let err = study
            .select_unit(UnitSelector::Unit(unit(7)), DirectionMode::Normal)
            .await
            .unwrap_err();
        assert!(matches!(err, StudyError::Load(_)));
        assert_eq!(study.nav().kind(), ScreenKind::UnitPicker);
        assert!(study.nav().notice().is_some());
        assert_eq!(study.location().fragment(), "#/");
    }

    #[tokio::test]
    async fn empty_unit_is_refused() {
        let (mut study, _events) = service(&fetcher(), "#/");
        study.initialize().await.unwrap();

        let err = study
            .select_unit(UnitSelector::Unit(unit(4)), DirectionMode::Normal)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StudyError::Navigation(NavigationError::EmptyDeck(_))
        ));
        assert_eq!(study.nav().kind(), ScreenKind::UnitPicker);
    }

    #[tokio::test]
    async fn bad_deep_link_lands_on_the_picker() {
        let (mut study, _events) = service(&fetcher(), "#/unitX/ja-en?index=3");
        study.initialize().await.unwrap();
        assert_eq!(study.nav().kind(), ScreenKind::UnitPicker);
        assert_eq!(study.location().fragment(), "#/");
    }

    #[tokio::test]
    async fn listing_speak_is_a_noop_without_speech() {
        let (mut study, _events) = service(&fetcher(), "#/unit3/list");
        study.initialize().await.unwrap();
        assert_eq!(study.listing_phrases().map(|p| p.len()), Some(2));
        assert!(!study.speak_listing_row(0, Language::English));
        assert!(!study.speech_available());
    }

    #[tokio::test]
    async fn autoplay_requires_a_session() {
        let (mut study, _events) = service(&fetcher(), "#/");
        study.initialize().await.unwrap();
        assert!(matches!(
            study.start_autoplay(),
            Err(StudyError::Navigation(NavigationError::InvalidTransition { .. }))
        ));
    }
}
