//! Location-fragment codec for navigable session state.
//!
//! Grammar (inside the fragment):
//!
//! ```text
//! #/                                            home
//! #/{all|unitN}/{ja-en|en-ja}?index=N&show=B[&random=true]
//! #/unitN/list?showEN=B&showJA=B
//! ```
//!
//! Anything else decodes to [`Route::Home`].

use url::form_urlencoded;

use crate::model::{DirectionMode, UnitId, UnitSelector};

const ALL_TOKEN: &str = "all";
const UNIT_PREFIX: &str = "unit";
const LIST_TOKEN: &str = "list";

/// The URL-encoded projection of the navigation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Flashcards {
        selector: UnitSelector,
        direction: DirectionMode,
        index: usize,
        show: bool,
        random: bool,
    },
    Listing {
        unit: UnitId,
        show_en: bool,
        show_ja: bool,
    },
}

impl Route {
    /// Encode as a fragment including the leading `#`.
    #[must_use]
    pub fn to_fragment(&self) -> String {
        match self {
            Route::Home => "#/".to_owned(),
            Route::Flashcards {
                selector,
                direction,
                index,
                show,
                random,
            } => {
                let mut query = form_urlencoded::Serializer::new(String::new());
                query.append_pair("index", &index.to_string());
                query.append_pair("show", bool_token(*show));
                if *random {
                    query.append_pair("random", "true");
                }
                format!(
                    "#/{}/{}?{}",
                    selector_token(*selector),
                    direction.token(),
                    query.finish()
                )
            }
            Route::Listing {
                unit,
                show_en,
                show_ja,
            } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("showEN", bool_token(*show_en))
                    .append_pair("showJA", bool_token(*show_ja))
                    .finish();
                format!("#/{UNIT_PREFIX}{unit}/{LIST_TOKEN}?{query}")
            }
        }
    }

    /// Decode a fragment, with or without the leading `#`.
    ///
    /// Malformed input never fails; it falls back to [`Route::Home`].
    #[must_use]
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        let (path, query) = fragment.split_once('?').unwrap_or((fragment, ""));

        let mut parts = path.split('/').filter(|part| !part.is_empty());
        let (Some(unit_token), Some(mode_token), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Route::Home;
        };

        let params = QueryParams::parse(query);

        if mode_token == LIST_TOKEN {
            let Some(UnitSelector::Unit(unit)) = parse_selector(unit_token) else {
                return Route::Home;
            };
            return Route::Listing {
                unit,
                show_en: params.flag("showEN").unwrap_or(true),
                show_ja: params.flag("showJA").unwrap_or(true),
            };
        }

        let (Some(direction), Some(selector)) = (
            DirectionMode::from_token(mode_token),
            parse_selector(unit_token),
        ) else {
            return Route::Home;
        };

        Route::Flashcards {
            selector,
            direction,
            index: params
                .get("index")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(0),
            show: params.flag("show").unwrap_or(false),
            random: params.flag("random").unwrap_or(false),
        }
    }
}

fn bool_token(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn selector_token(selector: UnitSelector) -> String {
    match selector {
        UnitSelector::All => ALL_TOKEN.to_owned(),
        UnitSelector::Unit(unit) => format!("{UNIT_PREFIX}{unit}"),
    }
}

fn parse_selector(token: &str) -> Option<UnitSelector> {
    if token == ALL_TOKEN {
        return Some(UnitSelector::All);
    }
    let digits = token.strip_prefix(UNIT_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<UnitId>().ok().map(UnitSelector::Unit)
}

struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn parse(query: &str) -> Self {
        Self(form_urlencoded::parse(query.as_bytes()).into_owned().collect())
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).map(|value| value == "true")
    }
}
