// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::SharedIdGenerator;
use crate::error::{OrganizerError, StoreError};
use crate::library::Library;
use crate::rules::{EpisodeSortType, EpisodeStatusRule, ReleaseDateRule, RuleSet};
use crate::settings::SharedSettingsStore;

/// A playlist as edited, before it has an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartPlaylistDraft {
    pub name: String,
    pub rules: RuleSet,
}

/// A saved smart playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartPlaylist {
    pub id: String,
    pub name: String,
    pub rules: RuleSet,
    #[serde(default)]
    pub sort_type: EpisodeSortType,
}

/// Saved smart playlists
pub struct SmartPlaylists {
    library: Arc<Library>,
    ids: SharedIdGenerator,
    settings: SharedSettingsStore,
}

impl SmartPlaylists {
    pub fn new(
        library: Arc<Library>,
        ids: SharedIdGenerator,
        settings: SharedSettingsStore,
    ) -> Self {
        Self {
            library,
            ids,
            settings,
        }
    }

    /// Save `draft`, as a new playlist when `id` is `None`, otherwise over
    /// the existing one. Returns the stored playlist.
    pub fn upsert(
        &self,
        id: Option<&str>,
        draft: SmartPlaylistDraft,
    ) -> Result<SmartPlaylist, StoreError> {
        let playlist = match id {
            Some(id) => {
                let existing = self
                    .library
                    .playlist(id)?
                    .ok_or_else(|| StoreError::PlaylistNotFound(id.to_string()))?;
                SmartPlaylist {
                    name: draft.name,
                    rules: draft.rules,
                    ..existing
                }
            }
            None => SmartPlaylist {
                id: self.ids.new_id(),
                name: draft.name,
                rules: draft.rules,
                sort_type: EpisodeSortType::default(),
            },
        };

        self.library.upsert_playlist(playlist.clone())?;
        debug!(playlist_id = %playlist.id, name = %playlist.name, "Smart playlist saved");
        Ok(playlist)
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.library.delete_playlist(id)
    }

    pub fn get(&self, id: &str) -> Result<Option<SmartPlaylist>, StoreError> {
        self.library.playlist(id)
    }

    pub fn list(&self) -> Result<Vec<SmartPlaylist>, StoreError> {
        self.library.playlists()
    }

    /// Create the stock playlists the first time this runs.
    ///
    /// Returns whether anything was created.
    pub fn setup_defaults(&self) -> Result<bool, OrganizerError> {
        self.setup_defaults_with(|_| Ok(()))
    }

    /// [`Self::setup_defaults`], running `persist` on the library once the
    /// playlists are stored and before they are recorded as created. If
    /// `persist` fails the new playlists are removed again and a later call
    /// retries.
    pub fn setup_defaults_with(
        &self,
        persist: impl FnOnce(&Library) -> Result<(), OrganizerError>,
    ) -> Result<bool, OrganizerError> {
        let mut settings = self.settings.load()?;
        if settings.created_default_playlists {
            return Ok(false);
        }

        let mut created = Vec::new();
        for draft in default_playlists() {
            created.push(self.upsert(None, draft)?.id);
        }

        if let Err(e) = persist(&self.library) {
            for id in &created {
                self.library.delete_playlist(id)?;
            }
            return Err(e);
        }

        settings.created_default_playlists = true;
        self.settings.save(&settings)?;
        info!("Default smart playlists created");
        Ok(true)
    }
}

fn default_playlists() -> [SmartPlaylistDraft; 2] {
    [
        SmartPlaylistDraft {
            name: "New Releases".to_string(),
            rules: RuleSet {
                episode_status: EpisodeStatusRule {
                    unplayed: true,
                    in_progress: true,
                    completed: false,
                },
                release_date: ReleaseDateRule::Last2Weeks,
                ..RuleSet::DEFAULT
            },
        },
        SmartPlaylistDraft {
            name: "In Progress".to_string(),
            rules: RuleSet {
                episode_status: EpisodeStatusRule {
                    unplayed: false,
                    in_progress: true,
                    completed: false,
                },
                release_date: ReleaseDateRule::LastMonth,
                ..RuleSet::DEFAULT
            },
        },
    ]
}
