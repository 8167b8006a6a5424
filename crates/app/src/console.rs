//! Plain-text rendering and a console stand-in for speech.

use std::time::Duration;

use async_trait::async_trait;
use phrase_core::model::{Language, SpeechSettings};
use services::{
    AutoplayStatus, AutoplayStep, FlashcardState, Location, SessionView, SpeechCapability,
    SpeechError, StudyService, Utterance,
};
use tokio::sync::Notify;

const HIDDEN: &str = "…";

// ─── Speech ────────────────────────────────────────────────────────────────

/// Prints utterances and holds for roughly as long as reading them aloud.
#[derive(Default)]
pub struct ConsoleSpeech {
    interrupt: Notify,
}

impl ConsoleSpeech {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpeechCapability for ConsoleSpeech {
    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        let voice = utterance.voice.as_deref().unwrap_or("auto");
        println!("  ♪ [{} {voice}] {}", utterance.language, utterance.text);
        tokio::select! {
            () = tokio::time::sleep(reading_time(&utterance)) => Ok(()),
            () = self.interrupt.notified() => Err(SpeechError::Interrupted),
        }
    }

    fn cancel(&self) {
        self.interrupt.notify_waiters();
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn reading_time(utterance: &Utterance) -> Duration {
    let chars = u64::try_from(utterance.text.chars().count()).unwrap_or(u64::MAX);
    let base = Duration::from_millis(chars.saturating_mul(70).saturating_add(300));
    if utterance.rate > 0.0 {
        base.div_f32(utterance.rate)
    } else {
        base
    }
}

// ─── Screens ───────────────────────────────────────────────────────────────

pub fn print_help() {
    println!("Commands:");
    println!("  study <n|all> [reverse]   start flashcards");
    println!("  list <n>                  show a unit's phrases");
    println!("  <enter> | next, prev      reveal / next card, previous card");
    println!("  shuffle                   toggle shuffled decks");
    println!("  play, stop, skip          autoplay");
    println!("  prev-unit, next-unit      step through listings");
    println!("  toggle-en, toggle-ja      hide or show a listing column");
    println!("  say [prompt|answer]       speak the current card");
    println!("  say <row> <en|ja>         speak a listing row");
    println!("  back, forward             history navigation");
    println!("  settings, close           open or close settings");
    println!("  set <key> <value>         en-rate ja-rate en-voice ja-voice");
    println!("                            auto-speak answer-delay next-delay");
    println!("  reset                     restore default settings");
    println!("  home, quit");
}

/// Render whatever screen is active.
#[must_use]
pub fn render<L: Location>(study: &StudyService<L>) -> String {
    let nav = study.nav();
    let mut lines = Vec::new();

    match nav.view() {
        SessionView::UnitPicker => {
            let units: Vec<String> = study
                .source()
                .list_unit_ids()
                .iter()
                .map(ToString::to_string)
                .collect();
            lines.push(format!("Units: {} | all", units.join(" ")));
            lines.push(format!(
                "Shuffle: {}",
                if nav.shuffle() { "on" } else { "off" }
            ));
            if let Some(selector) = nav.loading() {
                lines.push(format!("Loading {selector}..."));
            }
        }
        SessionView::UnitListing {
            unit,
            show_prompt,
            show_answer,
        } => {
            lines.push(format!("Unit {unit}"));
            let phrases = study.listing_phrases().map_or(&[][..], |phrases| &phrases[..]);
            for (row, phrase) in phrases.iter().enumerate() {
                let ja = if *show_prompt { phrase.prompt_text() } else { HIDDEN };
                let en = if *show_answer { phrase.answer_text() } else { HIDDEN };
                lines.push(format!("{:>3}. {ja} | {en}", row + 1));
            }
        }
        SessionView::Flashcards(state) => {
            render_card(&mut lines, state, study.autoplay_status(), nav.shuffle());
        }
        SessionView::Settings { .. } => render_settings(&mut lines, &study.settings()),
    }

    if let Some(notice) = nav.notice() {
        lines.push(format!("! {notice}"));
    }
    lines.join("\n")
}

fn render_card(
    lines: &mut Vec<String>,
    state: &FlashcardState,
    autoplay: AutoplayStatus,
    shuffle: bool,
) {
    let mut header = format!(
        "{} [{}/{}] {}",
        state.selector(),
        state.cursor() + 1,
        state.deck().len(),
        state.direction().token()
    );
    if shuffle {
        header.push_str(" shuffled");
    }
    match autoplay {
        AutoplayStatus::Running {
            step: AutoplayStep::Prompting,
            ..
        } => header.push_str(" ▶ prompt"),
        AutoplayStatus::Running {
            step: AutoplayStep::Revealing,
            ..
        } => header.push_str(" ▶ answer"),
        AutoplayStatus::Idle => {}
    }
    lines.push(header);

    let Some(phrase) = state.current() else {
        return;
    };
    let direction = state.direction();
    lines.push(format!("  {}", direction.prompt_of(phrase)));
    if state.answer_shown() {
        lines.push(format!("  {}", direction.answer_of(phrase)));
    } else {
        lines.push(format!("  {HIDDEN}"));
    }
}

fn render_settings(lines: &mut Vec<String>, settings: &SpeechSettings) {
    lines.push("Settings".to_owned());
    for language in [Language::English, Language::Japanese] {
        lines.push(format!(
            "  {language}: rate {:.2}, voice {}",
            settings.rate(language),
            settings.voice(language).unwrap_or("auto")
        ));
    }
    lines.push(format!(
        "  auto-speak: {}",
        if settings.auto_speak() { "on" } else { "off" }
    ));
    lines.push(format!(
        "  delays: {} ms before answer, {} ms before next",
        settings.delay_before_answer().as_millis(),
        settings.delay_before_next().as_millis()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_time_scales_with_rate() {
        let settings = SpeechSettings::default();
        let text = Utterance::new("Hello", Language::English, &settings);
        assert!((reading_time(&text).as_secs_f64() - 0.65).abs() < 1e-3);

        let mut faster = text.clone();
        faster.rate = 1.25;
        assert!((reading_time(&faster).as_secs_f64() - 0.52).abs() < 1e-3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_speech() {
        let speech = std::sync::Arc::new(ConsoleSpeech::new());
        let utterance = Utterance::new(
            "A rather long sentence to read",
            Language::English,
            &SpeechSettings::default(),
        );
        let speaking = tokio::spawn({
            let speech = std::sync::Arc::clone(&speech);
            async move { speech.speak(utterance).await }
        });
        tokio::task::yield_now().await;
        speech.cancel();
        assert_eq!(speaking.await.unwrap(), Err(SpeechError::Interrupted));
    }
}
