use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use phrase_core::model::{SpeechSettings, SpeechSettingsPatch};
use storage::repository::{SettingsRepository, StorageError};

use crate::error::SettingsServiceError;

/// Owns the live speech settings and keeps them persisted.
///
/// Readers hold a `watch` receiver, so every update is visible to a running
/// autoplay without a restart.
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
    current: watch::Sender<SpeechSettings>,
}

impl SettingsService {
    /// Load persisted settings, falling back to defaults if nothing was
    /// saved or the stored blob is unreadable.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if the store itself cannot be reached.
    pub async fn load(repo: Arc<dyn SettingsRepository>) -> Result<Self, SettingsServiceError> {
        let settings = match repo.load_settings().await {
            Ok(settings) => settings.unwrap_or_default(),
            Err(StorageError::Serialization(message)) => {
                warn!(error = %message, "stored speech settings are unreadable; using defaults");
                SpeechSettings::default()
            }
            Err(err) => return Err(err.into()),
        };
        let (current, _) = watch::channel(settings);
        Ok(Self { repo, current })
    }

    /// Defaults without touching storage.
    #[must_use]
    pub fn with_defaults(repo: Arc<dyn SettingsRepository>) -> Self {
        let (current, _) = watch::channel(SpeechSettings::default());
        Self { repo, current }
    }

    #[must_use]
    pub fn current(&self) -> SpeechSettings {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SpeechSettings> {
        self.current.subscribe()
    }

    /// Merge `patch`, clamp, persist and publish.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if persistence fails. The published
    /// value is left unchanged in that case.
    pub async fn update(
        &self,
        patch: SpeechSettingsPatch,
    ) -> Result<SpeechSettings, SettingsServiceError> {
        let next = self.current.borrow().merged(patch);
        self.repo.save_settings(&next).await?;
        self.current.send_replace(next.clone());
        Ok(next)
    }

    /// Restore defaults and clear the stored blob.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if the store cannot be cleared.
    pub async fn reset(&self) -> Result<SpeechSettings, SettingsServiceError> {
        self.repo.clear_settings().await?;
        let defaults = SpeechSettings::default();
        self.current.send_replace(defaults.clone());
        info!("speech settings reset to defaults");
        Ok(defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phrase_core::model::Language;
    use std::time::Duration;
    use storage::InMemorySettingsRepository;

    #[tokio::test]
    async fn missing_settings_load_as_defaults() {
        let service = SettingsService::load(Arc::new(InMemorySettingsRepository::new()))
            .await
            .unwrap();
        assert_eq!(service.current(), SpeechSettings::default());
    }

    #[tokio::test]
    async fn corrupt_blob_falls_back_to_defaults() {
        let repo = InMemorySettingsRepository::with_blob("{not json");
        let service = SettingsService::load(Arc::new(repo)).await.unwrap();
        assert_eq!(service.current(), SpeechSettings::default());
    }

    #[tokio::test]
    async fn update_persists_and_publishes() {
        let repo = InMemorySettingsRepository::new();
        let service = SettingsService::load(Arc::new(repo.clone())).await.unwrap();
        let mut watcher = service.subscribe();

        let saved = service
            .update(SpeechSettingsPatch {
                en_rate: Some(1.2),
                delay_before_next_ms: Some(500),
                ..SpeechSettingsPatch::default()
            })
            .await
            .unwrap();

        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), saved);
        assert_eq!(saved.delay_before_next(), Duration::from_millis(500));

        let reloaded = SettingsService::load(Arc::new(repo)).await.unwrap();
        assert!((reloaded.current().rate(Language::English) - 1.2).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn reset_clears_storage() {
        let repo = InMemorySettingsRepository::new();
        let service = SettingsService::load(Arc::new(repo.clone())).await.unwrap();
        service
            .update(SpeechSettingsPatch {
                auto_speak: Some(false),
                ..SpeechSettingsPatch::default()
            })
            .await
            .unwrap();

        let defaults = service.reset().await.unwrap();
        assert!(defaults.auto_speak());
        assert_eq!(repo.raw_blob().unwrap(), None);
    }
}
