use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::phrase::Language;

pub const MIN_RATE: f32 = 0.5;
pub const MAX_RATE: f32 = 1.5;
pub const MAX_DELAY_MS: u32 = 10_000;

const DEFAULT_RATE: f32 = 1.0;
const DEFAULT_DELAY_BEFORE_ANSWER_MS: u32 = 1_500;
const DEFAULT_DELAY_BEFORE_NEXT_MS: u32 = 2_000;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("settings blob is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Playback preferences shared by autoplay and the speech engine.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechSettings {
    en_rate: f32,
    ja_rate: f32,
    en_voice: String,
    ja_voice: String,
    auto_speak: bool,
    delay_before_answer_ms: u32,
    delay_before_next_ms: u32,
}

/// Partial update; `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeechSettingsPatch {
    pub en_rate: Option<f32>,
    pub ja_rate: Option<f32>,
    pub en_voice: Option<String>,
    pub ja_voice: Option<String>,
    pub auto_speak: Option<bool>,
    pub delay_before_answer_ms: Option<u32>,
    pub delay_before_next_ms: Option<u32>,
}

/// Wire shape of the persisted blob. Every field falls back to its default so
/// older or newer blobs still load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PersistedSpeechSettings {
    en_rate: f32,
    ja_rate: f32,
    en_voice: String,
    ja_voice: String,
    auto_speak: bool,
    delay_before_answer: u32,
    delay_before_next: u32,
}

impl Default for PersistedSpeechSettings {
    fn default() -> Self {
        Self::from(&SpeechSettings::default())
    }
}

impl From<&SpeechSettings> for PersistedSpeechSettings {
    fn from(settings: &SpeechSettings) -> Self {
        Self {
            en_rate: settings.en_rate,
            ja_rate: settings.ja_rate,
            en_voice: settings.en_voice.clone(),
            ja_voice: settings.ja_voice.clone(),
            auto_speak: settings.auto_speak,
            delay_before_answer: settings.delay_before_answer_ms,
            delay_before_next: settings.delay_before_next_ms,
        }
    }
}

impl From<PersistedSpeechSettings> for SpeechSettings {
    fn from(raw: PersistedSpeechSettings) -> Self {
        Self {
            en_rate: clamp_rate(raw.en_rate),
            ja_rate: clamp_rate(raw.ja_rate),
            en_voice: raw.en_voice.trim().to_owned(),
            ja_voice: raw.ja_voice.trim().to_owned(),
            auto_speak: raw.auto_speak,
            delay_before_answer_ms: raw.delay_before_answer.min(MAX_DELAY_MS),
            delay_before_next_ms: raw.delay_before_next.min(MAX_DELAY_MS),
        }
    }
}

impl SpeechSettings {
    /// Parse a persisted blob, merging it over the defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Malformed` if the blob is not a JSON object of
    /// the expected field types.
    pub fn from_json(blob: &str) -> Result<Self, SettingsError> {
        let raw: PersistedSpeechSettings = serde_json::from_str(blob)?;
        Ok(raw.into())
    }

    /// Serialize to the persisted blob format.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Malformed` if serialization fails.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(&PersistedSpeechSettings::from(self))?)
    }

    /// Returns a copy with `patch` applied and every value clamped.
    #[must_use]
    pub fn merged(&self, patch: SpeechSettingsPatch) -> Self {
        let mut raw = PersistedSpeechSettings::from(self);
        if let Some(rate) = patch.en_rate {
            raw.en_rate = rate;
        }
        if let Some(rate) = patch.ja_rate {
            raw.ja_rate = rate;
        }
        if let Some(voice) = patch.en_voice {
            raw.en_voice = voice;
        }
        if let Some(voice) = patch.ja_voice {
            raw.ja_voice = voice;
        }
        if let Some(auto_speak) = patch.auto_speak {
            raw.auto_speak = auto_speak;
        }
        if let Some(delay) = patch.delay_before_answer_ms {
            raw.delay_before_answer = delay;
        }
        if let Some(delay) = patch.delay_before_next_ms {
            raw.delay_before_next = delay;
        }
        raw.into()
    }

    #[must_use]
    pub fn rate(&self, language: Language) -> f32 {
        match language {
            Language::Japanese => self.ja_rate,
            Language::English => self.en_rate,
        }
    }

    /// Preferred voice identifier, or `None` for automatic selection.
    #[must_use]
    pub fn voice(&self, language: Language) -> Option<&str> {
        let voice = match language {
            Language::Japanese => &self.ja_voice,
            Language::English => &self.en_voice,
        };
        (!voice.is_empty()).then_some(voice.as_str())
    }

    #[must_use]
    pub fn auto_speak(&self) -> bool {
        self.auto_speak
    }

    #[must_use]
    pub fn delay_before_answer(&self) -> Duration {
        Duration::from_millis(u64::from(self.delay_before_answer_ms))
    }

    #[must_use]
    pub fn delay_before_next(&self) -> Duration {
        Duration::from_millis(u64::from(self.delay_before_next_ms))
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            en_rate: DEFAULT_RATE,
            ja_rate: DEFAULT_RATE,
            en_voice: String::new(),
            ja_voice: String::new(),
            auto_speak: true,
            delay_before_answer_ms: DEFAULT_DELAY_BEFORE_ANSWER_MS,
            delay_before_next_ms: DEFAULT_DELAY_BEFORE_NEXT_MS,
        }
    }
}

fn clamp_rate(rate: f32) -> f32 {
    if rate.is_nan() {
        return DEFAULT_RATE;
    }
    rate.clamp(MIN_RATE, MAX_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings = SpeechSettings::from_json(r#"{"enRate":1.25,"futureField":7}"#).unwrap();
        assert!((settings.rate(Language::English) - 1.25).abs() < f32::EPSILON);
        assert!((settings.rate(Language::Japanese) - 1.0).abs() < f32::EPSILON);
        assert_eq!(settings.delay_before_answer(), Duration::from_millis(1_500));
        assert!(settings.auto_speak());
    }

    #[test]
    fn blob_round_trips() {
        let settings = SpeechSettings::default().merged(SpeechSettingsPatch {
            ja_voice: Some("Kyoko".into()),
            delay_before_next_ms: Some(800),
            ..SpeechSettingsPatch::default()
        });
        let restored = SpeechSettings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(restored, settings);
        assert_eq!(restored.voice(Language::Japanese), Some("Kyoko"));
        assert_eq!(restored.voice(Language::English), None);
    }

    #[test]
    fn values_are_clamped() {
        let settings = SpeechSettings::default().merged(SpeechSettingsPatch {
            en_rate: Some(4.0),
            ja_rate: Some(0.1),
            delay_before_answer_ms: Some(60_000),
            ..SpeechSettingsPatch::default()
        });
        assert!((settings.rate(Language::English) - MAX_RATE).abs() < f32::EPSILON);
        assert!((settings.rate(Language::Japanese) - MIN_RATE).abs() < f32::EPSILON);
        assert_eq!(settings.delay_before_answer(), Duration::from_millis(10_000));
    }

    #[test]
    fn garbage_blob_is_an_error() {
        assert!(SpeechSettings::from_json("not json").is_err());
        assert!(SpeechSettings::from_json(r#"{"enRate":"fast"}"#).is_err());
    }
}
