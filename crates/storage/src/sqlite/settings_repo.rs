use async_trait::async_trait;
use phrase_core::model::SpeechSettings;
use sqlx::Row;

use crate::repository::{SettingsRepository, StorageError};

use super::SqliteRepository;

const SETTINGS_ROW_ID: i64 = 1;

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn load_settings(&self) -> Result<Option<SpeechSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT blob
            FROM speech_settings
            WHERE id = ?1
            ",
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let blob: String = row
            .try_get("blob")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        SpeechSettings::from_json(&blob)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_settings(&self, settings: &SpeechSettings) -> Result<(), StorageError> {
        let blob = settings
            .to_json()
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO speech_settings (id, blob, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                blob = excluded.blob,
                updated_at = excluded.updated_at
            ",
        )
        .bind(SETTINGS_ROW_ID)
        .bind(blob)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn clear_settings(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM speech_settings WHERE id = ?1")
            .bind(SETTINGS_ROW_ID)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
