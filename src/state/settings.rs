/// User settings
///
/// Loaded once by `main` before the window opens and handed to the
/// application explicitly. Every change is written back immediately.
use serde::{Deserialize, Serialize};

use super::store::KeyValueStore;
use crate::error::Result;

/// Key under which the settings are stored
pub const SETTINGS_KEY: &str = "settings";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

impl ThemeChoice {
    pub fn toggled(self) -> Self {
        match self {
            ThemeChoice::Dark => ThemeChoice::Light,
            ThemeChoice::Light => ThemeChoice::Dark,
        }
    }

    pub fn to_theme(self) -> iced::Theme {
        match self {
            ThemeChoice::Dark => iced::Theme::Dark,
            ThemeChoice::Light => iced::Theme::Light,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: ThemeChoice,
    /// Show the body region name next to each marker in the gallery
    pub show_region_labels: bool,
    /// Ask before deleting a marker
    pub confirm_delete: bool,
    /// Enable `debug` logging (and honour `RUST_LOG`)
    pub debug_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeChoice::Dark,
            show_region_labels: true,
            confirm_delete: true,
            debug_logging: false,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults on any failure
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("⚠️  Invalid settings, using defaults: {}", e);
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("⚠️  Could not read settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &impl KeyValueStore) -> Result<()> {
        store.set(SETTINGS_KEY, &serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::MemoryStore;

    #[test]
    fn test_defaults_when_missing() {
        let store = MemoryStore::default();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_defaults_when_corrupt() {
        let store = MemoryStore::default();
        store.set(SETTINGS_KEY, "{{{").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let store = MemoryStore::default();
        store.set(SETTINGS_KEY, r#"{"theme":"light"}"#).unwrap();

        let settings = Settings::load(&store);
        assert_eq!(settings.theme, ThemeChoice::Light);
        assert!(settings.confirm_delete);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::default();
        let mut settings = Settings::default();
        settings.theme = settings.theme.toggled();
        settings.debug_logging = true;

        settings.save(&store).unwrap();

        assert_eq!(Settings::load(&store), settings);
    }
}
