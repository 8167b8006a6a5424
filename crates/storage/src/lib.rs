#![forbid(unsafe_code)]

pub mod fetcher;
pub mod phrase_source;
pub mod repository;
pub mod sqlite;
pub mod unit_csv;

pub use fetcher::{FetchError, FsUnitFetcher, InMemoryFetcher, UnitFetcher};
pub use phrase_source::{LoadCause, LoadFailure, PhraseSource, UnitPhrases};
pub use repository::{InMemorySettingsRepository, SettingsRepository, Storage, StorageError};
