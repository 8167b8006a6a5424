use phrase_core::model::{SpeechSettings, SpeechSettingsPatch};
use storage::repository::SettingsRepository;
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrip_persists_settings() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_settings?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load_settings().await.expect("load").is_none());

    let settings = SpeechSettings::default().merged(SpeechSettingsPatch {
        en_voice: Some("Samantha".into()),
        delay_before_answer_ms: Some(500),
        ..SpeechSettingsPatch::default()
    });
    repo.save_settings(&settings).await.expect("save");

    let updated = settings.merged(SpeechSettingsPatch {
        auto_speak: Some(false),
        ..SpeechSettingsPatch::default()
    });
    repo.save_settings(&updated).await.expect("save again");

    let loaded = repo.load_settings().await.expect("load").expect("present");
    assert_eq!(loaded, updated);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent_and_clear_works() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo.migrate().await.expect("migrate twice");

    repo.save_settings(&SpeechSettings::default())
        .await
        .expect("save");
    repo.clear_settings().await.expect("clear");
    assert!(repo.load_settings().await.expect("load").is_none());
}
