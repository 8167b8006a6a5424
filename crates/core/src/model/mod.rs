mod catalog;
mod deck;
mod ids;
mod phrase;
mod settings;

pub use catalog::{DEFAULT_UNIT_COUNT, UnitCatalog, UnitFile, UnitStep};
pub use deck::Deck;
pub use ids::{UnitId, UnitIdError, UnitSelector};
pub use phrase::{DirectionMode, Language, PhraseRecord};
pub use settings::{
    MAX_DELAY_MS, MAX_RATE, MIN_RATE, SettingsError, SpeechSettings, SpeechSettingsPatch,
};
