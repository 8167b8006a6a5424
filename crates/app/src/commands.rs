//! Terminal commands.

use std::fmt;

use phrase_core::model::{DirectionMode, Language, SpeechSettingsPatch, UnitId, UnitSelector};

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Help,
    Quit,
    Home,
    Study {
        selector: UnitSelector,
        direction: DirectionMode,
    },
    List(UnitId),
    Advance,
    Retreat,
    Shuffle,
    Play,
    Stop,
    Skip,
    Back,
    Forward,
    PreviousUnit,
    NextUnit,
    ToggleEnglish,
    ToggleJapanese,
    SayPrompt,
    SayAnswer,
    SayRow { row: usize, language: Language },
    Settings,
    Close,
    Set(SpeechSettingsPatch),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    Unknown(String),
    Missing {
        command: &'static str,
        what: &'static str,
    },
    Invalid {
        what: &'static str,
        raw: String,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Unknown(raw) => write!(f, "unknown command: {raw} (try `help`)"),
            InputError::Missing { command, what } => write!(f, "{command} needs {what}"),
            InputError::Invalid { what, raw } => write!(f, "invalid {what}: {raw}"),
        }
    }
}

impl std::error::Error for InputError {}

impl Input {
    /// Parse one line. An empty line advances, like pressing the card.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for unknown commands or bad arguments.
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Input::Advance);
        };
        let input = match command {
            "help" | "?" => Input::Help,
            "quit" | "q" | "exit" => Input::Quit,
            "home" => Input::Home,
            "study" | "s" => {
                let selector = parse_selector(words.next(), "study")?;
                let direction = match words.next() {
                    None | Some("ja-en") => DirectionMode::Normal,
                    Some("reverse" | "en-ja") => DirectionMode::Reverse,
                    Some(raw) => {
                        return Err(InputError::Invalid {
                            what: "direction",
                            raw: raw.to_owned(),
                        });
                    }
                };
                Input::Study {
                    selector,
                    direction,
                }
            }
            "list" | "l" => match parse_selector(words.next(), "list")? {
                UnitSelector::Unit(unit) => Input::List(unit),
                UnitSelector::All => {
                    return Err(InputError::Invalid {
                        what: "unit",
                        raw: "all".to_owned(),
                    });
                }
            },
            "next" | "n" => Input::Advance,
            "prev" | "p" => Input::Retreat,
            "shuffle" => Input::Shuffle,
            "play" => Input::Play,
            "stop" => Input::Stop,
            "skip" => Input::Skip,
            "back" => Input::Back,
            "forward" => Input::Forward,
            "prev-unit" | "<" => Input::PreviousUnit,
            "next-unit" | ">" => Input::NextUnit,
            "toggle-en" => Input::ToggleEnglish,
            "toggle-ja" => Input::ToggleJapanese,
            "say" => parse_say(words.next(), words.next())?,
            "settings" => Input::Settings,
            "close" => Input::Close,
            "set" => parse_set(words.next(), words.next())?,
            "reset" => Input::Reset,
            other => return Err(InputError::Unknown(other.to_owned())),
        };
        Ok(input)
    }
}

fn parse_selector(word: Option<&str>, command: &'static str) -> Result<UnitSelector, InputError> {
    let raw = word.ok_or(InputError::Missing {
        command,
        what: "a unit number or `all`",
    })?;
    if raw == "all" {
        return Ok(UnitSelector::All);
    }
    raw.parse::<UnitId>()
        .map(UnitSelector::Unit)
        .map_err(|_| InputError::Invalid {
            what: "unit",
            raw: raw.to_owned(),
        })
}

fn parse_language(raw: &str) -> Result<Language, InputError> {
    match raw {
        "en" => Ok(Language::English),
        "ja" => Ok(Language::Japanese),
        _ => Err(InputError::Invalid {
            what: "language",
            raw: raw.to_owned(),
        }),
    }
}

fn parse_say(first: Option<&str>, second: Option<&str>) -> Result<Input, InputError> {
    match first {
        None | Some("prompt") => Ok(Input::SayPrompt),
        Some("answer") => Ok(Input::SayAnswer),
        Some(raw) => {
            let row = raw
                .parse::<usize>()
                .ok()
                .and_then(|row| row.checked_sub(1))
                .ok_or_else(|| InputError::Invalid {
                    what: "row",
                    raw: raw.to_owned(),
                })?;
            let language = parse_language(second.ok_or(InputError::Missing {
                command: "say",
                what: "`en` or `ja`",
            })?)?;
            Ok(Input::SayRow { row, language })
        }
    }
}

fn parse_set(key: Option<&str>, value: Option<&str>) -> Result<Input, InputError> {
    let key = key.ok_or(InputError::Missing {
        command: "set",
        what: "a setting name",
    })?;
    let value = value.ok_or(InputError::Missing {
        command: "set",
        what: "a value",
    })?;
    let invalid = |what: &'static str| InputError::Invalid {
        what,
        raw: value.to_owned(),
    };

    let mut patch = SpeechSettingsPatch::default();
    match key {
        "en-rate" => patch.en_rate = Some(value.parse().map_err(|_| invalid("rate"))?),
        "ja-rate" => patch.ja_rate = Some(value.parse().map_err(|_| invalid("rate"))?),
        "en-voice" => patch.en_voice = Some(voice_value(value)),
        "ja-voice" => patch.ja_voice = Some(voice_value(value)),
        "auto-speak" => {
            patch.auto_speak = Some(match value {
                "on" | "true" => true,
                "off" | "false" => false,
                _ => return Err(invalid("switch")),
            });
        }
        "answer-delay" => {
            patch.delay_before_answer_ms = Some(value.parse().map_err(|_| invalid("delay"))?);
        }
        "next-delay" => {
            patch.delay_before_next_ms = Some(value.parse().map_err(|_| invalid("delay"))?);
        }
        other => {
            return Err(InputError::Invalid {
                what: "setting",
                raw: other.to_owned(),
            });
        }
    }
    Ok(Input::Set(patch))
}

fn voice_value(raw: &str) -> String {
    if raw == "auto" {
        String::new()
    } else {
        raw.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_advances() {
        assert_eq!(Input::parse("   ").unwrap(), Input::Advance);
    }

    #[test]
    fn parses_study_targets() {
        assert_eq!(
            Input::parse("study 3").unwrap(),
            Input::Study {
                selector: UnitSelector::Unit(UnitId::new(3).unwrap()),
                direction: DirectionMode::Normal,
            }
        );
        assert_eq!(
            Input::parse("s all reverse").unwrap(),
            Input::Study {
                selector: UnitSelector::All,
                direction: DirectionMode::Reverse,
            }
        );
        assert!(Input::parse("study 0").is_err());
        assert!(Input::parse("list all").is_err());
    }

    #[test]
    fn parses_listing_rows() {
        assert_eq!(
            Input::parse("say 2 ja").unwrap(),
            Input::SayRow {
                row: 1,
                language: Language::Japanese,
            }
        );
        assert!(Input::parse("say 0 en").is_err());
        assert!(matches!(
            Input::parse("say 1"),
            Err(InputError::Missing { command: "say", .. })
        ));
    }

    #[test]
    fn parses_settings_patches() {
        let Input::Set(patch) = Input::parse("set next-delay 800").unwrap() else {
            panic!("expected a settings patch");
        };
        assert_eq!(patch.delay_before_next_ms, Some(800));

        let Input::Set(patch) = Input::parse("set ja-voice auto").unwrap() else {
            panic!("expected a settings patch");
        };
        assert_eq!(patch.ja_voice.as_deref(), Some(""));

        assert!(Input::parse("set en-rate fast").is_err());
        assert!(Input::parse("set volume 3").is_err());
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(
            Input::parse("dance").unwrap_err(),
            InputError::Unknown("dance".into())
        );
    }
}
