#![forbid(unsafe_code)]

pub mod app_services;
pub mod autoplay;
pub mod error;
pub mod navigation;
pub mod settings_service;
pub mod speech;
pub mod study;
pub mod url_sync;

pub use app_services::AppServices;
pub use autoplay::{AutoplayEngine, AutoplayEvent, AutoplayEventKind, AutoplayStatus, AutoplayStep};
pub use error::{AppServicesError, NavigationError, SettingsServiceError, StudyError};
pub use navigation::{Advance, FlashcardState, NavigationState, Notice, ScreenKind, SessionView};
pub use settings_service::SettingsService;
pub use speech::{SilentSpeech, SpeechCapability, SpeechError, Utterance};
pub use study::StudyService;
pub use url_sync::{Location, MemoryHistory, UrlSync};
