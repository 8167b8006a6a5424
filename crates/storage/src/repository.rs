use async_trait::async_trait;
use phrase_core::model::SpeechSettings;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence contract for the speech settings blob.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load the stored settings, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored blob is unreadable,
    /// or other storage errors.
    async fn load_settings(&self) -> Result<Option<SpeechSettings>, StorageError>;

    /// Persist the full settings value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &SpeechSettings) -> Result<(), StorageError>;

    /// Remove any stored settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be updated.
    async fn clear_settings(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository for tests and runs without a database.
///
/// Stores the serialized blob so it exercises the same encoding path as the
/// `SQLite` adapter.
#[derive(Clone, Default)]
pub struct InMemorySettingsRepository {
    blob: Arc<Mutex<Option<String>>>,
}

impl InMemorySettingsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with a raw blob, e.g. one written by an older build.
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }

    /// The raw stored blob, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw_blob(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .blob
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load_settings(&self) -> Result<Option<SpeechSettings>, StorageError> {
        self.raw_blob()?
            .map(|blob| {
                SpeechSettings::from_json(&blob)
                    .map_err(|err| StorageError::Serialization(err.to_string()))
            })
            .transpose()
    }

    async fn save_settings(&self, settings: &SpeechSettings) -> Result<(), StorageError> {
        let blob = settings
            .to_json()
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let mut guard = self
            .blob
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(blob);
        Ok(())
    }

    async fn clear_settings(&self) -> Result<(), StorageError> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub settings: Arc<dyn SettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let settings: Arc<dyn SettingsRepository> = Arc::new(InMemorySettingsRepository::new());
        Self { settings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phrase_core::model::SpeechSettingsPatch;

    #[tokio::test]
    async fn round_trips_settings() {
        let repo = InMemorySettingsRepository::new();
        assert!(repo.load_settings().await.unwrap().is_none());

        let settings = SpeechSettings::default().merged(SpeechSettingsPatch {
            auto_speak: Some(false),
            ..SpeechSettingsPatch::default()
        });
        repo.save_settings(&settings).await.unwrap();

        let loaded = repo.load_settings().await.unwrap().unwrap();
        assert_eq!(loaded, settings);

        repo.clear_settings().await.unwrap();
        assert!(repo.load_settings().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_blob_is_a_serialization_error() {
        let repo = InMemorySettingsRepository::with_blob("{not json");
        let err = repo.load_settings().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
