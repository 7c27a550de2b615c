//! Integration tests for settings persistence
//!
//! Exercises the file backend and the load/merge rules

use mockingbird::config::AppConfig;
use mockingbird::events::EventBus;
use mockingbird::settings::SETTINGS_KEY;
use mockingbird::storage::{FileStorage, MemoryStorage, Storage};
use mockingbird::{
    Appearance, ChatEvent, Chatbot, ResponseSpeed, SettingUpdate, Settings, SettingsStore, Theme,
};
use std::sync::Arc;

mod file_storage {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = FileStorage::new(dir.path());

        storage.set("prefs", r#"{"theme":"dark"}"#).expect("Failed to set");
        assert_eq!(
            storage.get("prefs").expect("Failed to get"),
            Some(r#"{"theme":"dark"}"#.to_string())
        );
    }

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get("nothing").expect("Failed to get"), None);
    }

    #[test]
    fn test_creates_nested_directory() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().join("a").join("b");
        let storage = FileStorage::new(&root);

        storage.set(SETTINGS_KEY, "{}").expect("Failed to set");
        assert!(root.join("chatbot-settings.json").exists());
    }

    #[test]
    fn test_unwritable_root_reports_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = dir.path().join("occupied");
        std::fs::write(&file, "not a directory").expect("Failed to write");

        let storage = FileStorage::new(&file);
        assert!(storage.set("key", "value").is_err());
    }
}

mod persistence {
    use super::*;

    #[test]
    fn test_theme_survives_reload() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()));

        let store = SettingsStore::load(storage.clone(), EventBus::new());
        store.update(SettingUpdate::Theme(Theme::Dark));

        let reloaded = SettingsStore::load(storage, EventBus::new());
        assert_eq!(reloaded.snapshot().theme, Theme::Dark);
        assert_eq!(reloaded.snapshot().response_speed, ResponseSpeed::Normal);
    }

    #[test]
    fn test_every_update_persists_full_blob() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SettingsStore::load(storage.clone(), EventBus::new());

        store.update(SettingUpdate::SoundEnabled(false));
        store.update(SettingUpdate::ResponseSpeed(ResponseSpeed::Fast));

        let blob = storage
            .get(SETTINGS_KEY)
            .expect("Failed to get")
            .expect("settings were not persisted");
        let value: serde_json::Value = serde_json::from_str(&blob).expect("invalid JSON");
        assert_eq!(value["theme"], "light");
        assert_eq!(value["responseSpeed"], "fast");
        assert_eq!(value["soundEnabled"], false);
        assert_eq!(value["typingIndicator"], true);
    }

    #[test]
    fn test_partial_blob_keeps_defaults() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(SETTINGS_KEY, r#"{"responseSpeed":"slow"}"#)
            .expect("Failed to set");

        let store = SettingsStore::load(storage, EventBus::new());
        assert_eq!(
            store.snapshot(),
            Settings {
                response_speed: ResponseSpeed::Slow,
                ..Settings::default()
            }
        );
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = FileStorage::new(dir.path());
        storage.set(SETTINGS_KEY, "{{{{").expect("Failed to set");

        let store = SettingsStore::load(Arc::new(storage), EventBus::new());
        assert_eq!(store.snapshot(), Settings::default());
    }
}

mod session {
    use super::*;

    #[test]
    fn test_open_uses_configured_directory() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };

        let bot = Chatbot::open(&config);
        bot.update(SettingUpdate::TypingIndicator(false));

        let reopened = Chatbot::open(&config);
        assert!(!reopened.settings.snapshot().typing_indicator);
    }

    #[test]
    fn test_auto_theme_tracks_system() {
        let config = AppConfig {
            system_appearance: Appearance::Dark,
            ..AppConfig::default()
        };
        let bot = Chatbot::with_storage(Arc::new(MemoryStorage::new()), &config);
        let mut rx = bot.subscribe();

        assert_eq!(bot.appearance(), Appearance::Light);
        bot.update(SettingUpdate::Theme(Theme::Auto));
        assert_eq!(bot.appearance(), Appearance::Dark);
        assert_eq!(
            rx.try_recv().expect("no theme event"),
            ChatEvent::ThemeChanged(Appearance::Dark)
        );

        bot.set_system_appearance(Appearance::Light);
        assert_eq!(
            rx.try_recv().expect("no theme event"),
            ChatEvent::ThemeChanged(Appearance::Light)
        );
    }
}
