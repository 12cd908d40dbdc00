// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::folders::PodcastsSortType;

/// User state persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hash of the subscribed podcast ids the current suggestions were made for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_folders_hash: Option<String>,
    /// Last time the suggestion prompt was dismissed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_folders_dismiss_timestamp: Option<DateTime<Utc>>,
    pub suggested_folders_dismiss_count: u32,
    /// Global default ordering, copied into new folders
    pub podcasts_sort_type: PodcastsSortType,
    pub created_default_playlists: bool,
}

/// Backing storage for [`Settings`]
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings, SettingsError>;

    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// A shared reference to a settings store
pub type SharedSettingsStore = Arc<dyn SettingsStore>;

/// Settings kept in a JSON file; a missing file reads as defaults
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|e| SettingsError::ReadFailed {
                path: self.path.clone(),
                source: e,
            })?;

        serde_json::from_str(&content).map_err(|e| SettingsError::JsonParseFailed {
            path: self.path.clone(),
            source: e,
        })
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json).map_err(|e| SettingsError::WriteFailed {
            path: self.path.clone(),
            source: e,
        })
    }
}

/// Settings held in memory only
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    /// Create a new MemorySettingsStore wrapped in an Arc
    pub fn shared(settings: Settings) -> SharedSettingsStore {
        Arc::new(Self::new(settings))
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        self.settings
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| SettingsError::Poisoned)
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let mut guard = self.settings.lock().map_err(|_| SettingsError::Poisoned)?;
        *guard = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_defaults() {
        let dir = tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("settings.json"));

        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn json_store_persists_between_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings {
            suggested_folders_hash: Some("sha256:abc".to_string()),
            suggested_folders_dismiss_count: 1,
            podcasts_sort_type: PodcastsSortType::NameAToZ,
            ..Settings::default()
        };
        JsonSettingsStore::new(&path).save(&settings).unwrap();

        assert_eq!(JsonSettingsStore::new(&path).load().unwrap(), settings);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"suggested_folders_dismiss_count": 2}"#).unwrap();

        let settings = JsonSettingsStore::new(&path).load().unwrap();

        assert_eq!(settings.suggested_folders_dismiss_count, 2);
        assert!(settings.suggested_folders_hash.is_none());
        assert!(!settings.created_default_playlists);
    }

    #[test]
    fn invalid_json_returns_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{").unwrap();

        let result = JsonSettingsStore::new(&path).load();
        assert!(matches!(result, Err(SettingsError::JsonParseFailed { .. })));
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemorySettingsStore::default();
        let settings = Settings {
            created_default_playlists: true,
            ..Settings::default()
        };

        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }
}
