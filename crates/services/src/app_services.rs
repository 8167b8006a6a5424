use std::path::PathBuf;
use std::sync::Arc;

use phrase_core::model::UnitCatalog;
use storage::repository::Storage;
use storage::{FsUnitFetcher, PhraseSource, UnitFetcher};
use tokio::sync::mpsc;

use crate::autoplay::AutoplayEvent;
use crate::error::AppServicesError;
use crate::settings_service::SettingsService;
use crate::speech::SpeechCapability;
use crate::study::StudyService;
use crate::url_sync::Location;

/// Assembles the phrase source and settings for a front end.
pub struct AppServices {
    data_dir: PathBuf,
    source: PhraseSource,
    settings: SettingsService,
}

impl AppServices {
    /// Build services with settings persisted in `SQLite` and unit files read
    /// from `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the settings
    /// load fails.
    pub async fn new_sqlite(
        db_url: &str,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, data_dir).await
    }

    /// Build services whose settings live only for this process.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the settings load fails.
    pub async fn in_memory(data_dir: impl Into<PathBuf>) -> Result<Self, AppServicesError> {
        Self::from_storage(Storage::in_memory(), data_dir).await
    }

    async fn from_storage(
        storage: Storage,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppServicesError> {
        let data_dir = data_dir.into();
        let fetcher: Arc<dyn UnitFetcher> = Arc::new(FsUnitFetcher::new(data_dir.clone()));
        let source = PhraseSource::new(UnitCatalog::default(), fetcher);
        let settings = SettingsService::load(Arc::clone(&storage.settings)).await?;
        Ok(Self {
            data_dir,
            source,
            settings,
        })
    }

    #[must_use]
    pub fn data_dir(&self) -> &std::path::Path {
        &self.data_dir
    }

    /// Hand everything to a study session bound to `location`.
    #[must_use]
    pub fn into_study<L: Location>(
        self,
        speech: Arc<dyn SpeechCapability>,
        location: L,
    ) -> (StudyService<L>, mpsc::UnboundedReceiver<AutoplayEvent>) {
        StudyService::new(self.source, self.settings, speech, location)
    }
}
