// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for the folder organizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerOptions {
    /// Number of colours new folders cycle through
    pub folder_palette_size: usize,
    /// Days the suggestion prompt stays hidden after a dismissal
    pub prompt_cooldown_days: i64,
    /// Dismissals after which the prompt never returns
    pub prompt_max_dismissals: u32,
    /// URL of the folder suggestion endpoint, unset when suggestions are off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_endpoint: Option<String>,
}

impl Default for OrganizerOptions {
    fn default() -> Self {
        Self {
            folder_palette_size: 12,
            prompt_cooldown_days: 7,
            prompt_max_dismissals: 2,
            suggestion_endpoint: None,
        }
    }
}

impl OrganizerOptions {
    /// Read options from a JSON file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::JsonParseFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if options.prompt_cooldown().is_none() {
            return Err(ConfigError::InvalidCooldown {
                path: path.to_path_buf(),
                days: options.prompt_cooldown_days,
            });
        }
        Ok(options)
    }

    /// The prompt cooldown window; `None` when the day count is negative or
    /// too large to represent
    pub fn prompt_cooldown(&self) -> Option<TimeDelta> {
        if self.prompt_cooldown_days < 0 {
            return None;
        }
        TimeDelta::try_days(self.prompt_cooldown_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_merges_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"folder_palette_size": 4}"#).unwrap();

        let options = OrganizerOptions::load(&path).unwrap();

        assert_eq!(options.folder_palette_size, 4);
        assert_eq!(options.prompt_cooldown_days, 7);
        assert_eq!(options.prompt_max_dismissals, 2);
        assert!(options.suggestion_endpoint.is_none());
    }

    #[test]
    fn load_rejects_unrepresentable_cooldowns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.json");

        for days in [-1, i64::MAX] {
            std::fs::write(&path, format!(r#"{{"prompt_cooldown_days": {days}}}"#)).unwrap();
            let result = OrganizerOptions::load(&path);
            assert!(
                matches!(result, Err(ConfigError::InvalidCooldown { days: d, .. }) if d == days),
                "{days} days accepted"
            );
        }
    }

    #[test]
    fn large_but_representable_cooldown_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"prompt_cooldown_days": 100000000000}"#).unwrap();

        let options = OrganizerOptions::load(&path).unwrap();

        assert!(options.prompt_cooldown().is_some());
    }

    #[test]
    fn load_missing_file_returns_error() {
        let dir = tempdir().unwrap();
        let result = OrganizerOptions::load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(ConfigError::ReadFailed { .. })));
    }
}
