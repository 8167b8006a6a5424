//! Hands-free playback through a deck.
//!
//! The engine never touches `NavigationState`. It runs the sequence on a
//! tokio task and announces each step as an [`AutoplayEvent`]; the owner
//! applies the events whose generation is still live.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use phrase_core::model::{Deck, DirectionMode, Language, PhraseRecord, SpeechSettings};

use crate::speech::{SpeechCapability, Utterance};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoplayStep {
    Prompting,
    Revealing,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AutoplayStatus {
    #[default]
    Idle,
    Running { step: AutoplayStep, index: usize },
}

impl AutoplayStatus {
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(self, AutoplayStatus::Running { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoplayEventKind {
    /// Put the cursor on `index` with the answer hidden or shown.
    Show { index: usize, answer_shown: bool },
    /// The deck was played to the end.
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoplayEvent {
    pub generation: u64,
    pub kind: AutoplayEventKind,
}

#[derive(Debug, Default)]
struct EngineState {
    generation: u64,
    status: AutoplayStatus,
}

struct Playlist {
    phrases: Arc<[Arc<PhraseRecord>]>,
    direction: DirectionMode,
}

pub struct AutoplayEngine {
    speech: Arc<dyn SpeechCapability>,
    settings: watch::Receiver<SpeechSettings>,
    events: mpsc::UnboundedSender<AutoplayEvent>,
    state: Arc<Mutex<EngineState>>,
    playlist: Option<Arc<Playlist>>,
    task: Option<JoinHandle<()>>,
}

impl AutoplayEngine {
    /// Create an idle engine and the receiving end of its event stream.
    #[must_use]
    pub fn new(
        speech: Arc<dyn SpeechCapability>,
        settings: watch::Receiver<SpeechSettings>,
    ) -> (Self, mpsc::UnboundedReceiver<AutoplayEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let engine = Self {
            speech,
            settings,
            events,
            state: Arc::new(Mutex::new(EngineState::default())),
            playlist: None,
            task: None,
        };
        (engine, receiver)
    }

    #[must_use]
    pub fn status(&self) -> AutoplayStatus {
        lock(&self.state).status
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        lock(&self.state).generation
    }

    /// Whether `event` belongs to the current run.
    #[must_use]
    pub fn is_live(&self, event: &AutoplayEvent) -> bool {
        event.generation == self.generation()
    }

    /// Play `deck` from `from`. Returns `false` (and changes nothing) if a
    /// run is already in progress or `from` is past the end of the deck.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(&mut self, deck: &Deck, direction: DirectionMode, from: usize) -> bool {
        if self.is_running() {
            debug!("autoplay already running");
            return false;
        }
        if from >= deck.len() {
            return false;
        }
        info!(selector = %deck.selector(), from, "autoplay started");
        self.playlist = Some(Arc::new(Playlist {
            phrases: deck.shared_phrases(),
            direction,
        }));
        self.launch(from, AutoplayStep::Prompting);
        true
    }

    /// Stop the run, discarding its pending steps. Returns whether a run was
    /// in progress.
    pub fn stop(&mut self) -> bool {
        let was_running = {
            let mut state = lock(&self.state);
            state.generation += 1;
            std::mem::take(&mut state.status).is_running()
        };
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.playlist = None;
        if was_running {
            self.speech.cancel();
            info!("autoplay stopped");
        }
        was_running
    }

    /// Jump to the next step: the answer of the current card, or the next
    /// card's prompt. Skipping the last answer finishes the run.
    pub fn skip_to_next(&mut self) -> bool {
        let (step, index) = match self.status() {
            AutoplayStatus::Idle => return false,
            AutoplayStatus::Running { step, index } => (step, index),
        };
        let len = self
            .playlist
            .as_ref()
            .map_or(0, |playlist| playlist.phrases.len());

        self.speech.cancel();
        match step {
            AutoplayStep::Prompting => self.launch(index, AutoplayStep::Revealing),
            AutoplayStep::Revealing if index + 1 < len => {
                self.launch(index + 1, AutoplayStep::Prompting);
            }
            AutoplayStep::Revealing => self.finish(),
        }
        true
    }

    fn launch(&mut self, index: usize, step: AutoplayStep) {
        let Some(playlist) = self.playlist.clone() else {
            return;
        };
        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.status = AutoplayStatus::Running { step, index };
            state.generation
        };
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let runner = Runner {
            speech: Arc::clone(&self.speech),
            settings: self.settings.clone(),
            events: self.events.clone(),
            state: Arc::clone(&self.state),
            playlist,
            generation,
        };
        self.task = Some(tokio::spawn(runner.run(index, step)));
    }

    fn finish(&mut self) {
        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.status = AutoplayStatus::Idle;
            state.generation
        };
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.playlist = None;
        info!("autoplay finished");
        send(
            &self.events,
            AutoplayEvent {
                generation,
                kind: AutoplayEventKind::Finished,
            },
        );
    }
}

impl Drop for AutoplayEngine {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

//
// ─── RUN LOOP ──────────────────────────────────────────────────────────────────
//

struct Runner {
    speech: Arc<dyn SpeechCapability>,
    settings: watch::Receiver<SpeechSettings>,
    events: mpsc::UnboundedSender<AutoplayEvent>,
    state: Arc<Mutex<EngineState>>,
    playlist: Arc<Playlist>,
    generation: u64,
}

impl Runner {
    async fn run(self, mut index: usize, mut step: AutoplayStep) {
        let direction = self.playlist.direction;
        while let Some(phrase) = self.playlist.phrases.get(index).cloned() {
            if step == AutoplayStep::Prompting {
                if !self.announce(AutoplayStep::Prompting, index) {
                    return;
                }
                self.speak(direction.prompt_of(&phrase), direction.prompt_language())
                    .await;
                let delay = self.settings.borrow().delay_before_answer();
                tokio::time::sleep(delay).await;
            }

            if !self.announce(AutoplayStep::Revealing, index) {
                return;
            }
            self.speak(direction.answer_of(&phrase), direction.answer_language())
                .await;
            let delay = self.settings.borrow().delay_before_next();
            tokio::time::sleep(delay).await;

            index += 1;
            step = AutoplayStep::Prompting;
        }

        let mut state = lock(&self.state);
        if state.generation != self.generation {
            return;
        }
        state.status = AutoplayStatus::Idle;
        info!("autoplay finished");
        send(
            &self.events,
            AutoplayEvent {
                generation: self.generation,
                kind: AutoplayEventKind::Finished,
            },
        );
    }

    /// Record and publish a step. Returns `false` once this run is stale.
    fn announce(&self, step: AutoplayStep, index: usize) -> bool {
        let mut state = lock(&self.state);
        if state.generation != self.generation {
            return false;
        }
        state.status = AutoplayStatus::Running { step, index };
        send(
            &self.events,
            AutoplayEvent {
                generation: self.generation,
                kind: AutoplayEventKind::Show {
                    index,
                    answer_shown: step == AutoplayStep::Revealing,
                },
            },
        );
        true
    }

    async fn speak(&self, text: &str, language: Language) {
        if !self.speech.is_available() {
            return;
        }
        let utterance = {
            let settings = self.settings.borrow();
            Utterance::new(text, language, &settings)
        };
        if let Err(err) = self.speech.speak(utterance).await {
            debug!(error = %err, "autoplay utterance ended early");
        }
    }
}

fn send(events: &mpsc::UnboundedSender<AutoplayEvent>, event: AutoplayEvent) {
    if events.send(event).is_err() {
        debug!("autoplay event receiver dropped");
    }
}

fn lock(state: &Mutex<EngineState>) -> MutexGuard<'_, EngineState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
