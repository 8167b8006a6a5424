//! Shared error types for the services crate.

use thiserror::Error;

use phrase_core::model::UnitSelector;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use storage::LoadFailure;

use crate::navigation::ScreenKind;

/// Errors emitted by `NavigationState` transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("cannot {action} from the {from} screen")]
    InvalidTransition {
        from: ScreenKind,
        action: &'static str,
    },
    #[error("{0} has no phrases")]
    EmptyDeck(UnitSelector),
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StudyService` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyError {
    #[error(transparent)]
    Load(#[from] LoadFailure),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Settings(#[from] SettingsServiceError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Settings(#[from] SettingsServiceError),
}
