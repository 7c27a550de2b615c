//! User preferences and their persistence.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::SettingsError;
use crate::events::{ChatEvent, EventBus};
use crate::storage::Storage;
use crate::theme::resolve_appearance;
use crate::types::{Appearance, ResponseSpeed, Theme};

/// Storage key holding the serialized settings blob.
pub const SETTINGS_KEY: &str = "chatbot-settings";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub response_speed: ResponseSpeed,
    pub sound_enabled: bool,
    #[serde(rename = "typingIndicator", alias = "typingIndicatorEnabled")]
    pub typing_indicator: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            response_speed: ResponseSpeed::Normal,
            sound_enabled: true,
            typing_indicator: true,
        }
    }
}

impl Settings {
    /// Defaults overlaid with whatever recognised keys in `raw` decode.
    /// Anything that is not a JSON object yields the defaults.
    pub fn from_blob(raw: &str) -> Self {
        let mut settings = Self::default();
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => settings.overlay(fields),
            Ok(other) => {
                tracing::warn!(kind = json_kind(&other), "settings blob is not an object, using defaults");
            }
            Err(err) => {
                tracing::warn!(error = %err, "settings blob is corrupt, using defaults");
            }
        }
        settings
    }

    fn overlay(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            let applied = match key.as_str() {
                "theme" => decode(value).map(|theme| self.theme = theme),
                "responseSpeed" => decode(value).map(|speed| self.response_speed = speed),
                "soundEnabled" => decode(value).map(|enabled| self.sound_enabled = enabled),
                "typingIndicator" | "typingIndicatorEnabled" => {
                    decode(value).map(|enabled| self.typing_indicator = enabled)
                }
                _ => {
                    tracing::debug!(%key, "ignoring unknown settings key");
                    continue;
                }
            };
            if let Err(err) = applied {
                tracing::warn!(%key, error = %err, "ignoring undecodable setting");
            }
        }
    }

    pub fn apply(&mut self, change: SettingUpdate) {
        match change {
            SettingUpdate::Theme(theme) => self.theme = theme,
            SettingUpdate::ResponseSpeed(speed) => self.response_speed = speed,
            SettingUpdate::SoundEnabled(enabled) => self.sound_enabled = enabled,
            SettingUpdate::TypingIndicator(enabled) => self.typing_indicator = enabled,
        }
    }

    pub fn to_blob(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A single field change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingUpdate {
    Theme(Theme),
    ResponseSpeed(ResponseSpeed),
    SoundEnabled(bool),
    TypingIndicator(bool),
}

impl SettingUpdate {
    /// Parse a textual `key`/`value` pair as entered in a form or command.
    pub fn parse(key: &str, value: &str) -> Result<Self, SettingsError> {
        let normalized = value.trim().to_ascii_lowercase();
        match key.trim() {
            "theme" => match normalized.as_str() {
                "light" => Ok(Self::Theme(Theme::Light)),
                "dark" => Ok(Self::Theme(Theme::Dark)),
                "auto" => Ok(Self::Theme(Theme::Auto)),
                _ => Err(invalid("theme", value, "light, dark, auto")),
            },
            "responseSpeed" | "speed" => match normalized.as_str() {
                "fast" => Ok(Self::ResponseSpeed(ResponseSpeed::Fast)),
                "normal" => Ok(Self::ResponseSpeed(ResponseSpeed::Normal)),
                "slow" => Ok(Self::ResponseSpeed(ResponseSpeed::Slow)),
                _ => Err(invalid("responseSpeed", value, "fast, normal, slow")),
            },
            "soundEnabled" | "sound" => parse_flag(&normalized)
                .map(Self::SoundEnabled)
                .ok_or_else(|| invalid("soundEnabled", value, "on, off")),
            "typingIndicator" | "typing" => parse_flag(&normalized)
                .map(Self::TypingIndicator)
                .ok_or_else(|| invalid("typingIndicator", value, "on, off")),
            other => Err(SettingsError::UnknownKey(other.to_string())),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &'static str, value: &str, expected: &'static str) -> SettingsError {
    SettingsError::InvalidValue {
        key,
        value: value.to_string(),
        expected,
    }
}

// ============================================
// Store
// ============================================

pub struct SettingsStore {
    settings: RwLock<Settings>,
    system: RwLock<Appearance>,
    storage: Arc<dyn Storage>,
    events: EventBus,
}

impl SettingsStore {
    /// Build the store from persisted state. Never fails: storage errors and
    /// corrupt blobs leave the defaults in place.
    pub fn load(storage: Arc<dyn Storage>, events: EventBus) -> Self {
        let settings = match storage.get(SETTINGS_KEY) {
            Ok(Some(raw)) => Settings::from_blob(&raw),
            Ok(None) => Settings::default(),
            Err(err) => {
                tracing::warn!(error = %err, "settings storage unavailable, using defaults");
                Settings::default()
            }
        };
        tracing::debug!(?settings, "settings loaded");

        Self {
            settings: RwLock::new(settings),
            system: RwLock::new(Appearance::default()),
            storage,
            events,
        }
    }

    pub fn with_system_appearance(self, appearance: Appearance) -> Self {
        *self.system.write().unwrap_or_else(PoisonError::into_inner) = appearance;
        self
    }

    pub fn snapshot(&self) -> Settings {
        *self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn system_appearance(&self) -> Appearance {
        *self.system.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Light/dark look the renderer should use right now.
    pub fn appearance(&self) -> Appearance {
        resolve_appearance(self.snapshot().theme, self.system_appearance())
    }

    pub fn update(&self, change: SettingUpdate) {
        let snapshot = {
            let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
            settings.apply(change);
            *settings
        };
        tracing::info!(?change, "setting updated");

        self.persist(&snapshot);

        if let SettingUpdate::Theme(theme) = change {
            let appearance = resolve_appearance(theme, self.system_appearance());
            self.events.emit(ChatEvent::ThemeChanged(appearance));
        }
    }

    /// Record the host colour-scheme preference. Re-signals the theme when it
    /// changes while the theme follows the system.
    pub fn set_system_appearance(&self, appearance: Appearance) {
        let previous = {
            let mut system = self.system.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *system, appearance)
        };
        if previous != appearance && self.snapshot().theme == Theme::Auto {
            self.events.emit(ChatEvent::ThemeChanged(appearance));
        }
    }

    /// Write the full blob; failures are logged and the in-memory state kept.
    fn persist(&self, settings: &Settings) {
        if let Err(err) = write_blob(self.storage.as_ref(), settings) {
            tracing::warn!(error = %err, "failed to persist settings, keeping in-memory state");
        }
    }
}

fn write_blob(storage: &dyn Storage, settings: &Settings) -> Result<(), SettingsError> {
    let blob = settings.to_blob()?;
    storage.set(SETTINGS_KEY, &blob)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStorage;

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }
    }

    #[test]
    fn test_blob_uses_camel_case_field_names() {
        let blob = Settings::default().to_blob().unwrap();
        let value: Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(value["theme"], "light");
        assert_eq!(value["responseSpeed"], "normal");
        assert_eq!(value["soundEnabled"], true);
        assert_eq!(value["typingIndicator"], true);
    }

    #[test]
    fn test_partial_blob_keeps_defaults() {
        let settings = Settings::from_blob(r#"{"theme":"dark"}"#);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.response_speed, ResponseSpeed::Normal);
        assert!(settings.sound_enabled);
        assert!(settings.typing_indicator);
    }

    #[test]
    fn test_bad_values_and_unknown_keys_ignored() {
        let settings = Settings::from_blob(
            r#"{"theme":"neon","responseSpeed":"slow","soundEnabled":"loud","extra":1}"#,
        );
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.response_speed, ResponseSpeed::Slow);
        assert!(settings.sound_enabled);
    }

    #[test]
    fn test_alias_key_accepted() {
        let settings = Settings::from_blob(r#"{"typingIndicatorEnabled":false}"#);
        assert!(!settings.typing_indicator);
    }

    #[test]
    fn test_corrupt_blob_falls_back() {
        assert_eq!(Settings::from_blob("{not json"), Settings::default());
        assert_eq!(Settings::from_blob("[1,2]"), Settings::default());
    }

    #[test]
    fn test_parse_updates() {
        assert_eq!(
            SettingUpdate::parse("theme", "Dark").unwrap(),
            SettingUpdate::Theme(Theme::Dark)
        );
        assert_eq!(
            SettingUpdate::parse("speed", "fast").unwrap(),
            SettingUpdate::ResponseSpeed(ResponseSpeed::Fast)
        );
        assert_eq!(
            SettingUpdate::parse("soundEnabled", "off").unwrap(),
            SettingUpdate::SoundEnabled(false)
        );
        assert!(matches!(
            SettingUpdate::parse("volume", "11"),
            Err(SettingsError::UnknownKey(_))
        ));
        assert!(matches!(
            SettingUpdate::parse("theme", "neon"),
            Err(SettingsError::InvalidValue { key: "theme", .. })
        ));
    }

    #[test]
    fn test_broken_storage_is_not_fatal() {
        let store = SettingsStore::load(Arc::new(BrokenStorage), EventBus::new());
        assert_eq!(store.snapshot(), Settings::default());

        store.update(SettingUpdate::ResponseSpeed(ResponseSpeed::Slow));
        assert_eq!(store.snapshot().response_speed, ResponseSpeed::Slow);

        let reloaded = SettingsStore::load(Arc::new(BrokenStorage), EventBus::new());
        assert_eq!(reloaded.snapshot(), Settings::default());
    }

    #[test]
    fn test_theme_update_emits_resolved_appearance() {
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let store = SettingsStore::load(Arc::new(MemoryStorage::new()), events)
            .with_system_appearance(Appearance::Dark);

        store.update(SettingUpdate::SoundEnabled(false));
        assert!(rx.try_recv().is_err());

        store.update(SettingUpdate::Theme(Theme::Auto));
        assert_eq!(
            rx.try_recv().unwrap(),
            ChatEvent::ThemeChanged(Appearance::Dark)
        );
    }

    #[test]
    fn test_system_change_only_matters_for_auto() {
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let store = SettingsStore::load(Arc::new(MemoryStorage::new()), events);

        store.set_system_appearance(Appearance::Dark);
        assert!(rx.try_recv().is_err());
        assert_eq!(store.appearance(), Appearance::Light);

        store.update(SettingUpdate::Theme(Theme::Auto));
        assert_eq!(
            rx.try_recv().unwrap(),
            ChatEvent::ThemeChanged(Appearance::Dark)
        );

        store.set_system_appearance(Appearance::Dark);
        assert!(rx.try_recv().is_err());

        store.set_system_appearance(Appearance::Light);
        assert_eq!(
            rx.try_recv().unwrap(),
            ChatEvent::ThemeChanged(Appearance::Light)
        );
    }
}
