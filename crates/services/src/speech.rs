//! Text-to-speech seam.
//!
//! The engine itself is host-provided; everything above it is written
//! against [`SpeechCapability`] so it runs unchanged without audio.

use async_trait::async_trait;
use thiserror::Error;

use phrase_core::model::{Language, SpeechSettings};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpeechError {
    #[error("speech is unavailable")]
    Unavailable,
    #[error("utterance was interrupted")]
    Interrupted,
    #[error("speech engine failed: {0}")]
    Engine(String),
}

/// One request to speak a piece of text.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: Language,
    pub rate: f32,
    /// Preferred voice, or `None` for the engine's choice for `language`.
    pub voice: Option<String>,
}

impl Utterance {
    /// Build an utterance using the rate and voice configured for `language`.
    #[must_use]
    pub fn new(text: impl Into<String>, language: Language, settings: &SpeechSettings) -> Self {
        Self {
            text: text.into(),
            language,
            rate: settings.rate(language),
            voice: settings.voice(language).map(str::to_owned),
        }
    }
}

#[async_trait]
pub trait SpeechCapability: Send + Sync {
    /// Speak and resolve once the utterance finished playing.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the utterance could not be played to the end.
    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError>;

    /// Stop whatever is currently being spoken.
    fn cancel(&self);

    fn is_available(&self) -> bool;
}

/// Speech for hosts without an engine. Every call completes immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSpeech;

#[async_trait]
impl SpeechCapability for SilentSpeech {
    async fn speak(&self, _utterance: Utterance) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn cancel(&self) {}

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phrase_core::model::SpeechSettingsPatch;

    #[test]
    fn utterance_picks_language_settings() {
        let settings = SpeechSettings::default().merged(SpeechSettingsPatch {
            ja_rate: Some(0.8),
            ja_voice: Some("Kyoko".into()),
            ..SpeechSettingsPatch::default()
        });
        let ja = Utterance::new("はい", Language::Japanese, &settings);
        assert!((ja.rate - 0.8).abs() < f32::EPSILON);
        assert_eq!(ja.voice.as_deref(), Some("Kyoko"));

        let en = Utterance::new("Yes", Language::English, &settings);
        assert!((en.rate - 1.0).abs() < f32::EPSILON);
        assert_eq!(en.voice, None);
    }

    #[tokio::test]
    async fn silent_speech_reports_unavailable() {
        let speech = SilentSpeech;
        assert!(!speech.is_available());
        let utterance = Utterance::new("Hello", Language::English, &SpeechSettings::default());
        assert_eq!(speech.speak(utterance).await, Err(SpeechError::Unavailable));
    }
}
