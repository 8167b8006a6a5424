use std::fmt;

use crate::model::ids::UnitId;

//
// ─── LANGUAGE ──────────────────────────────────────────────────────────────────
//

/// The two sides of every phrase pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    Japanese,
    English,
}

impl Language {
    /// BCP-47 tag handed to speech engines.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Language::Japanese => "ja-JP",
            Language::English => "en-US",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

//
// ─── PHRASE ────────────────────────────────────────────────────────────────────
//

/// One bilingual pair loaded from a unit file.
///
/// `prompt_text` is the native (Japanese) side, `answer_text` the target
/// (English) side. Records are immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhraseRecord {
    unit_id: UnitId,
    ordinal: String,
    prompt_text: String,
    answer_text: String,
}

impl PhraseRecord {
    #[must_use]
    pub fn new(
        unit_id: UnitId,
        ordinal: impl Into<String>,
        prompt_text: impl Into<String>,
        answer_text: impl Into<String>,
    ) -> Self {
        Self {
            unit_id,
            ordinal: ordinal.into(),
            prompt_text: prompt_text.into(),
            answer_text: answer_text.into(),
        }
    }

    #[must_use]
    pub fn unit_id(&self) -> UnitId {
        self.unit_id
    }

    #[must_use]
    pub fn ordinal(&self) -> &str {
        &self.ordinal
    }

    #[must_use]
    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    #[must_use]
    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    /// Text for the given language side.
    #[must_use]
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::Japanese => &self.prompt_text,
            Language::English => &self.answer_text,
        }
    }
}

//
// ─── DIRECTION ─────────────────────────────────────────────────────────────────
//

/// Which language is asked and which is revealed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DirectionMode {
    /// Japanese prompt, English answer.
    #[default]
    Normal,
    /// English prompt, Japanese answer.
    Reverse,
}

impl DirectionMode {
    #[must_use]
    pub fn prompt_language(self) -> Language {
        match self {
            Self::Normal => Language::Japanese,
            Self::Reverse => Language::English,
        }
    }

    #[must_use]
    pub fn answer_language(self) -> Language {
        match self {
            Self::Normal => Language::English,
            Self::Reverse => Language::Japanese,
        }
    }

    #[must_use]
    pub fn prompt_of(self, phrase: &PhraseRecord) -> &str {
        phrase.text(self.prompt_language())
    }

    #[must_use]
    pub fn answer_of(self, phrase: &PhraseRecord) -> &str {
        phrase.text(self.answer_language())
    }

    /// Path token used in location fragments.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Normal => "ja-en",
            Self::Reverse => "en-ja",
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ja-en" => Some(Self::Normal),
            "en-ja" => Some(Self::Reverse),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello() -> PhraseRecord {
        PhraseRecord::new(UnitId::new(3).unwrap(), "1", "こんにちは", "Hello")
    }

    #[test]
    fn direction_swaps_sides() {
        let phrase = hello();
        assert_eq!(DirectionMode::Normal.prompt_of(&phrase), "こんにちは");
        assert_eq!(DirectionMode::Normal.answer_of(&phrase), "Hello");
        assert_eq!(DirectionMode::Reverse.prompt_of(&phrase), "Hello");
        assert_eq!(DirectionMode::Reverse.answer_of(&phrase), "こんにちは");
        assert_eq!(DirectionMode::Reverse.prompt_language(), Language::English);
    }

    #[test]
    fn tokens_round_trip() {
        for mode in [DirectionMode::Normal, DirectionMode::Reverse] {
            assert_eq!(DirectionMode::from_token(mode.token()), Some(mode));
        }
        assert_eq!(DirectionMode::from_token("list"), None);
    }
}
